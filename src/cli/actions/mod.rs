pub mod server;

/// Actions the binary can execute.
#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}
