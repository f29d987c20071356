use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use subspace_core::InputField;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Poll => app.poll(false),
        AppEvent::Api(result) => app.handle_api(result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A notice blocks everything else until acknowledged
    if app.dashboard.notice().is_some() {
        app.dashboard.dismiss_notice();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Form
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.begin_editing(InputField::Query);
        }
        KeyCode::Char('e') => {
            app.begin_editing(InputField::Email);
        }
        KeyCode::Char('p') => {
            app.begin_editing(InputField::Password);
        }
        KeyCode::Char('c') => app.toggle_credentials(),

        // Commands
        KeyCode::Enter | KeyCode::Char('s') => app.trigger_primary(),
        KeyCode::Char('x') => app.stop_automation(),
        KeyCode::Char('r') => app.poll(true),

        // View
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next_activity(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_activity(),
        KeyCode::Char('g') => app.select_first_activity(),
        KeyCode::Char('G') => app.select_last_activity(),
        KeyCode::Char('J') | KeyCode::PageDown => app.scroll_logs_down(),
        KeyCode::Char('K') | KeyCode::PageUp => app.scroll_logs_up(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.start_automation();
        }
        KeyCode::Tab => app.next_field(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_logs = app.logs_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_table = app.table_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_logs {
                app.scroll_logs_down();
            } else if in_table {
                app.select_next_activity();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_logs {
                app.scroll_logs_up();
            } else if in_table {
                app.select_prev_activity();
            }
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use subspace_core::{ApiClient, Config};
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        App::new(Config::new(), client, tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_into_query() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);

        type_text(&mut app, "Recruiterx");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.dashboard.query(), "Recruiter");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_enter_with_empty_query_warns_and_any_key_dismisses() {
        let mut app = test_app();
        press(&mut app, KeyCode::Enter);
        assert!(app.dashboard.notice().is_some());

        // The dismissing key does nothing else.
        press(&mut app, KeyCode::Char('q'));
        assert!(app.dashboard.notice().is_none());
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_credential_keys_need_visible_panel() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "me@example.com");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "pw");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.dashboard.credentials().email, "me@example.com");
        assert_eq!(app.dashboard.credentials().password, "pw");
    }

    #[test]
    fn test_ctrl_c_quits_even_while_editing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        handle_event(
            &mut app,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = test_app();
        assert!(app.dark_mode);
        press(&mut app, KeyCode::Char('t'));
        assert!(!app.dark_mode);
    }

    #[test]
    fn test_resize_leaves_state_alone() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('i'));
        handle_event(&mut app, AppEvent::Resize);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(!app.should_quit);
        assert!(app.dashboard.notice().is_none());
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(point_in_rect(2, 3, rect));
        assert!(point_in_rect(5, 7, rect));
        assert!(!point_in_rect(6, 3, rect));
        assert!(!point_in_rect(2, 8, rect));
    }
}
