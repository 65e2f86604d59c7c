use crate::{agent::Agent, ports::UpdateSource, Result};

/// Feed saved-message texts to the agent until the source closes.
///
/// Each command runs to completion before the next text is read, so commands
/// never interleave. Any error (corrupt alias file, client failure) ends the loop.
pub async fn run(agent: &mut Agent, updates: &mut dyn UpdateSource) -> Result<()> {
    let mut handled = 0u64;
    while let Some(text) = updates.next_text().await? {
        if agent.handle_text(&text).await? {
            handled += 1;
        }
    }
    tracing::info!(handled, "update source closed");
    Ok(())
}
