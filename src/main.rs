use std::process::ExitCode;

use stampede::interface::command::execute;

#[tokio::main]
pub async fn main() -> ExitCode {
    execute().await
}
