//! Controller: runs dispatched commands and keeps the screen in step with
//! the session.

use std::io::Write;

use termdash_terminal::{AppContext, CommandResult, ResultKind};

use crate::app_state::AppState;
use crate::render::ViewRenderer;

/// Dispatch `text` and apply its result. Errors are logged; the session
/// keeps running.
///
/// When the page or focus changed the whole page is redrawn; otherwise only
/// the view a result was stored for.
pub fn process_command<W: Write>(text: &str, state: &mut AppState<W>) {
    let page_before = current_page_id(state);
    let focus_before = focused_view_id(state);

    let refreshed = match state.registry.process(text, &mut state.session) {
        Ok(Some(result)) => apply_result(result, state),
        Ok(None) => None,
        Err(e) => {
            log::error!("[{text}]: {e}");
            let _ = writeln!(state.renderer.output_mut(), "error: {e}");
            None
        },
    };

    if !state.is_running() {
        return;
    }
    if current_page_id(state) != page_before || focused_view_id(state) != focus_before {
        redraw_page(state);
    } else if let Some(view_id) = refreshed {
        if let Err(e) = state.renderer.draw_view(&view_id, &state.session) {
            log::error!("Drawing [{view_id}] failed: {e}");
        }
    }
}

/// Store the result under its key and focus its view. Returns the view to
/// refresh, if any.
fn apply_result<W: Write>(result: CommandResult, state: &mut AppState<W>) -> Option<String> {
    if result.kind != ResultKind::Json {
        return None;
    }
    log::debug!("Storing result under [{}]", result.key);
    state.session.register_data(&result.key, result.data);

    let view_id = result.view_id?;
    if !state.session.focus_on_view_id(&view_id) {
        log::warn!("Result view [{view_id}] does not exist");
        return None;
    }
    Some(view_id)
}

/// Run the select expression of the focused table against row `index`
/// and dispatch the command line it produces.
pub fn select_row<W: Write>(index: usize, state: &mut AppState<W>) {
    let Some(view_id) = focused_view_id(state) else {
        log::warn!("No focused view to select from");
        return;
    };
    match state.renderer.select_row(&view_id, index, &state.session) {
        Some(line) => process_command(&line, state),
        None => log::warn!("Nothing to select at row {index} of [{view_id}]"),
    }
}

/// Draw the current page.
pub fn redraw_page<W: Write>(state: &mut AppState<W>) {
    let Some(page) = state.session.current_page().cloned() else {
        return;
    };
    if let Err(e) = state.renderer.draw_page(&page, &state.session) {
        log::error!("Drawing page [{}] failed: {e}", page.id);
    }
}

fn current_page_id<W: Write>(state: &AppState<W>) -> Option<String> {
    state.session.current_page().map(|p| p.id.clone())
}

fn focused_view_id<W: Write>(state: &AppState<W>) -> Option<String> {
    state.session.focused_view().map(|v| v.id.clone())
}
