//! Chat messages for build events.

use buildwatch_core::{BuildEvent, BuildPhase, BuildResult};

/// Render a build event as a chat message.
pub fn format_event(event: &BuildEvent) -> String {
    match &event.phase {
        BuildPhase::Started => format!(
            "🚀 Jenkins job *{}* started build *#{}*.\n{}",
            event.job_name, event.build_number, event.build_url
        ),
        BuildPhase::Finished(result) => format!(
            "{} Jenkins job *{}* finished build *#{}* with *{}*.\n{}",
            result_icon(result),
            event.job_name,
            event.build_number,
            result,
            event.build_url
        ),
    }
}

fn result_icon(result: &BuildResult) -> &'static str {
    match result {
        BuildResult::Success => "✅",
        BuildResult::Failure => "❌",
        BuildResult::Aborted => "🚫",
        BuildResult::Other(_) => "⚠️",
    }
}
