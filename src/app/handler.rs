//! Input handling and per-tick updates: maps key/mouse events, frames and
//! worker results to state mutations.
//!
//! Every entry point takes `now` explicitly so the timing rules can be
//! exercised from tests without a clock.

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::Action;
use crate::core::catalog::BoardState;
use crate::core::effects::{active_line, manifesto_progress};
use crate::core::page::{LayoutProvider, ScrollSink, SectionKind, MANIFESTO};

use super::preview::{
    DocumentState, ModalTransition, PreviewPane, DOCUMENT_LOAD_FAILED,
};
use super::state::AppState;
use super::worker::{self, WorkerUpdate};

/// Share of the viewport one page key moves.
const PAGE_STEP: f64 = 0.9;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    if state.modal.is_visible() {
        handle_preview_action(state, action, now);
        return;
    }

    let step = match action {
        Action::ScrollUp => -state.config.key_step_px,
        Action::ScrollDown => state.config.key_step_px,
        Action::PageUp => -state.page.viewport().height * PAGE_STEP,
        Action::PageDown => state.page.viewport().height * PAGE_STEP,
        _ => 0.0,
    };
    if step != 0.0 {
        user_scroll(state, step, now);
        return;
    }

    match action {
        Action::Quit => state.should_quit = true,
        Action::Top => {
            let before = state.page.scroll_y();
            state.page.set_scroll_y(0.0);
            if state.page.scroll_y() != before {
                notify_scrolled(state, now);
            }
        }
        Action::NextTab => {
            let count = state.tab_count();
            if count > 0 {
                state.active_tab = (state.active_tab + 1) % count;
            }
        }
        Action::BoardUp => {
            state.board_selected = state.board_selected.saturating_sub(1);
        }
        Action::BoardDown => {
            let len = state.board.records().len();
            if state.board_selected + 1 < len {
                state.board_selected += 1;
            }
        }
        Action::Download => queue_download(state),
        Action::Reload => request_catalog(state),
        Action::PreviewArtwork => state.modal.open(PreviewPane::Artwork, now),
        Action::PreviewDocument => state.modal.open(PreviewPane::Document, now),
        _ => {}
    }
}

/// While the preview is up only closing, quitting and paging apply.
fn handle_preview_action(state: &mut AppState, action: Action, now: Instant) {
    match action {
        Action::Quit => state.should_quit = true,
        Action::ClosePreview => state.modal.close(now),
        Action::PrevPage => turn_page(state, false),
        Action::NextPage => turn_page(state, true),
        _ => {}
    }
}

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    if state.modal.is_visible() {
        handle_preview_mouse(state, mouse, now);
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => user_scroll(state, state.config.wheel_step_px, now),
        MouseEventKind::ScrollUp => user_scroll(state, -state.config.wheel_step_px, now),
        MouseEventKind::Down(MouseButton::Left) => {
            let hit = state
                .board_hits
                .iter()
                .find(|(rect, _)| point_in_rect(*rect, mouse.column, mouse.row))
                .map(|&(_, index)| index);
            if let Some(index) = hit {
                state.board_selected = index;
                queue_download(state);
            }
        }
        _ => {}
    }
}

fn handle_preview_mouse(state: &mut AppState, mouse: MouseEvent, now: Instant) {
    let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
        return;
    };
    let Some(zones) = state.lightbox_hits else {
        return;
    };
    if point_in_rect(zones.close_rect, mouse.column, mouse.row)
        || !point_in_rect(zones.overlay_rect, mouse.column, mouse.row)
    {
        state.modal.close(now);
    } else if point_in_rect(zones.prev_rect, mouse.column, mouse.row) {
        turn_page(state, false);
    } else if point_in_rect(zones.next_rect, mouse.column, mouse.row) {
        turn_page(state, true);
    }
}

// ── scrolling ───────────────────────────────────────────────────

/// Native scroll from the wheel or keys.  Blocked while the preview holds
/// the page.
pub fn user_scroll(state: &mut AppState, delta: f64, now: Instant) {
    if state.modal.locks_scroll() {
        return;
    }
    let before = state.page.scroll_y();
    state.page.scroll_by(delta);
    if state.page.scroll_y() != before {
        notify_scrolled(state, now);
    }
}

/// Every change of the offset, native or programmatic, lands here.
pub fn notify_scrolled(state: &mut AppState, now: Instant) {
    state.throttle.on_scroll(now);
    refresh_scroll_effects(state);
}

/// Recompute the effects that only change on scroll.
pub fn refresh_scroll_effects(state: &mut AppState) {
    if let Some(progress) = manifesto_progress(&state.page, MANIFESTO) {
        let lines = manifesto_line_count(state);
        state.manifesto_line = active_line(progress, lines);
    }
    state.reveals.observe(
        &state.page,
        state
            .page
            .spec
            .sections
            .iter()
            .filter(|s| s.fade_up)
            .map(|s| s.id.as_str()),
    );
}

fn manifesto_line_count(state: &AppState) -> usize {
    state
        .page
        .spec
        .sections
        .iter()
        .find_map(|s| match &s.kind {
            SectionKind::Manifesto { lines } if s.id == MANIFESTO => Some(lines.len()),
            _ => None,
        })
        .unwrap_or(0)
}

/// Run the snap decision if the throttle window has closed.
pub fn run_snap_tick(state: &mut AppState, now: Instant) {
    if !state.throttle.poll(now) || !state.snap_enabled {
        return;
    }
    if let Some(command) = state.engine.decide(&mut state.session, &state.page) {
        state.driver.start(state.page.scroll_y(), &command);
    }
}

/// One animation frame: advance the smooth scroll and modal transitions.
pub fn advance_frame(state: &mut AppState, now: Instant) {
    if state.driver.is_animating() {
        let before = state.page.scroll_y();
        state.driver.frame(now, &mut state.page, &mut state.session);
        if state.page.scroll_y() != before {
            notify_scrolled(state, now);
        }
    }

    match state.modal.tick(now) {
        Some(ModalTransition::Shown(PreviewPane::Document)) => {
            // A failed load is retried on every open.
            if matches!(state.document, DocumentState::NotLoaded | DocumentState::Failed) {
                if state.document_path.is_some() {
                    state.document = DocumentState::Loading;
                    state.needs_document_open = true;
                } else {
                    state.document = DocumentState::Unavailable;
                }
            }
        }
        Some(ModalTransition::Hidden) => state.lightbox_hits = None,
        _ => {}
    }
}

pub fn handle_resize(state: &mut AppState, area: Rect, now: Instant) {
    let before = state.page.scroll_y();
    state.resize(area);
    if state.page.scroll_y() != before {
        notify_scrolled(state, now);
    } else {
        refresh_scroll_effects(state);
    }
}

// ── board / document ────────────────────────────────────────────

fn queue_download(state: &mut AppState) {
    match state.selected_record().cloned() {
        Some(record) => {
            state.status_message = Some(format!("Downloading {}…", record.display_title()));
            state.pending_download = Some(record);
        }
        None => state.status_message = Some("Nothing to download.".into()),
    }
}

fn request_catalog(state: &mut AppState) {
    if state.catalog_url.is_none() {
        return;
    }
    state.board = BoardState::Loading;
    state.needs_catalog_fetch = true;
}

fn turn_page(state: &mut AppState, forward: bool) {
    if !state.modal.is_shown() {
        return;
    }
    if let DocumentState::Ready { pager, .. } = &mut state.document {
        let render = if forward { pager.next() } else { pager.prev() };
        if render.is_some() {
            state.pending_page_render = render;
        }
    }
}

/// Apply a background result, dropping those from superseded requests.
pub fn apply_worker_update(state: &mut AppState, update: WorkerUpdate) {
    match update {
        WorkerUpdate::CatalogLoaded { generation, result } => {
            if generation != state.catalog_generation {
                return;
            }
            state.board = BoardState::from_result(&result);
            let len = state.board.records().len();
            state.board_selected = state.board_selected.min(len.saturating_sub(1));
            // Freshly rendered rows fade in together.
            for section in state.page.spec.sections.iter().filter(|s| s.fade_up) {
                state.reveals.reveal(&section.id);
            }
        }
        WorkerUpdate::Downloaded { title, result } => {
            state.status_message = Some(match result {
                Ok(path) => format!("Saved {title} to {}", path.display()),
                Err(e) => format!("Download of {title} failed: {e}"),
            });
        }
        WorkerUpdate::DocumentOpened { generation, result } => {
            if generation != state.document_generation {
                return;
            }
            state.document = match result {
                Ok(pages) => DocumentState::ready(pages),
                Err(_) => DocumentState::Failed,
            };
            if let DocumentState::Ready { pager, .. } = &mut state.document {
                state.pending_page_render = pager.queue_render(1);
            }
        }
        WorkerUpdate::PageRendered {
            generation,
            page,
            result,
        } => {
            if generation != state.document_generation {
                return;
            }
            let DocumentState::Ready { pager, current, .. } = &mut state.document else {
                return;
            };
            match result {
                Ok(image) if page == pager.page() => *current = Some(image),
                Ok(_) => {}
                Err(e) if current.is_none() => {
                    // Nothing was ever shown: the document itself is unreadable.
                    tracing::warn!(page, "first page render failed: {e}");
                    state.document = DocumentState::Failed;
                    state.pending_page_render = None;
                    return;
                }
                Err(e) => {
                    tracing::warn!(page, "page render failed: {e}");
                    state.status_message = Some(DOCUMENT_LOAD_FAILED.into());
                }
            }
            state.pending_page_render = pager.on_rendered();
        }
    }
}

/// Spawn whatever jobs the handlers asked for since the last call.
pub fn dispatch_jobs(state: &mut AppState, tx: &mpsc::UnboundedSender<WorkerUpdate>) {
    if std::mem::take(&mut state.needs_catalog_fetch) {
        if let Some(base) = state.catalog_url.clone() {
            state.catalog_generation = state.catalog_generation.wrapping_add(1);
            worker::spawn_catalog_fetch(tx.clone(), state.catalog_generation, base);
        }
    }

    if let Some(record) = state.pending_download.take() {
        if let Some(base) = state.catalog_url.clone() {
            worker::spawn_download(tx.clone(), base, record, state.download_dir.clone());
        }
    }

    if std::mem::take(&mut state.needs_document_open) {
        if let Some(path) = state.document_path.clone() {
            state.document_generation = state.document_generation.wrapping_add(1);
            worker::spawn_document_open(tx.clone(), state.document_generation, path);
        }
    }

    if let Some(page) = state.pending_page_render.take() {
        if let DocumentState::Ready { pages, .. } = &state.document {
            // Half-block cells: one pixel wide, two tall.
            let max_w = u32::from(state.terminal_area.width);
            let max_h = u32::from(state.terminal_area.height) * 2;
            worker::spawn_page_render(
                tx.clone(),
                state.document_generation,
                pages.clone(),
                page,
                max_w,
                max_h,
            );
        }
    }
}

fn point_in_rect(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x
        && col < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}
