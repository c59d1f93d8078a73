use crate::context::AppContext;
use crate::error::AppResult;
use crate::prompt::Console;
use crate::workflow::credentials::CredentialStore;
use crate::workflow::session::Session;

/// Runs the create-ticket loop. Returns how many tickets were created.
pub async fn run(
    ctx: &AppContext,
    credentials: CredentialStore,
    console: &mut dyn Console,
) -> AppResult<usize> {
    Session::new(ctx, credentials, console).run().await
}
