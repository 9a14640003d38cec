//! Event Handling
//!
//! Keyboard and event handling for labsite.

use crate::app::{App, Mode, Page};
use anyhow::Result;
use crossterm::event::{poll, read, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Handle events, returns true if app should quit
pub fn handle_events(app: &mut App) -> Result<bool> {
    app.on_tick();
    if poll(Duration::from_millis(100))? {
        if let Event::Key(key) = read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(false);
            }
            return Ok(handle_key_event(app, key.code, key.modifiers));
        }
    }
    Ok(false)
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    // Global quit shortcut
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, code, modifiers),
        Mode::Help => {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.mode = Mode::Normal;
            }
            false
        }
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if app.filter_active {
        match code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Enter => app.filter_active = false,
            KeyCode::Backspace => {
                app.filter_text.pop();
                app.apply_filter();
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.filter_text.push(c);
                app.apply_filter();
            }
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.previous(),
        KeyCode::Char('g') | KeyCode::Home => app.go_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.go_to_bottom(),
        KeyCode::PageDown => app.page_down(10),
        KeyCode::PageUp => app.page_up(10),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => app.page_down(10),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.page_up(10),

        // Pages
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => app.next_page(),
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => app.previous_page(),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(page) = Page::ALL.get(idx) {
                app.switch_page(*page);
            }
        }

        // Publication filters
        KeyCode::Char('y') if app.page == Page::Publications => app.cycle_publication_year(),
        KeyCode::Char('t') if app.page == Page::Publications => app.cycle_publication_type(),
        KeyCode::Char('x') if app.page == Page::Publications => app.reset_publication_filter(),

        // Text filter
        KeyCode::Char('/') => {
            app.filter_active = true;
        }
        KeyCode::Esc => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('?') => app.mode = Mode::Help,

        _ => {}
    }

    false
}
