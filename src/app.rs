use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use fruitcade::config::Variant;
use fruitcade::launcher::LaunchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostChoice {
    Menu,
    PlayAgain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    /// Drawn once while the child process starts up.
    Running(Variant),
    PostGame { variant: Variant, score: u32 },
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub selected_game: usize, // index into Variant::all()
    pub post_choice: PostChoice,
    pub banner: Option<String>,
    pub best: [Option<u32>; 3],
    pending: Option<Variant>,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            screen: Screen::Menu,
            selected_game: 0,
            post_choice: PostChoice::Menu,
            banner: None,
            best: [None; 3],
            pending: None,
        }
    }

    pub fn selected_variant(&self) -> Variant {
        Variant::all()[self.selected_game]
    }

    fn launch(&mut self, variant: Variant) {
        self.selected_game = variant.index();
        self.banner = None;
        self.screen = Screen::Running(variant);
        self.pending = Some(variant);
    }

    /// The game to run next, if one was requested since the last call.
    pub fn take_pending(&mut self) -> Option<Variant> {
        self.pending.take()
    }

    pub fn finish(&mut self, variant: Variant, result: Result<u32, LaunchError>) {
        match result {
            Ok(score) => {
                let best = &mut self.best[variant.index()];
                *best = Some(best.map_or(score, |b| b.max(score)));
                self.post_choice = PostChoice::Menu;
                self.screen = Screen::PostGame { variant, score };
            }
            Err(err) => {
                log::warn!("{err}");
                self.banner = Some(err.to_string());
                self.screen = Screen::Menu;
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Menu => self.on_menu_key(key),
            Screen::PostGame { variant, .. } => self.on_post_game_key(key, variant),
            Screen::Running(_) => {}
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        let count = Variant::all().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.launch(Variant::Slicer),
            KeyCode::Char('2') => self.launch(Variant::Eater),
            KeyCode::Char('3') => self.launch(Variant::Catcher),
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                self.selected_game = (self.selected_game + 1) % count;
            }
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                self.selected_game = (self.selected_game + count - 1) % count;
            }
            KeyCode::Enter => self.launch(self.selected_variant()),
            _ => {}
        }
    }

    fn on_post_game_key(&mut self, key: KeyEvent, variant: Variant) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.post_choice = match self.post_choice {
                    PostChoice::Menu => PostChoice::PlayAgain,
                    PostChoice::PlayAgain => PostChoice::Menu,
                };
            }
            KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Esc => self.screen = Screen::Menu,
            KeyCode::Char('p') | KeyCode::Char('P') => self.launch(variant),
            KeyCode::Enter => match self.post_choice {
                PostChoice::Menu => self.screen = Screen::Menu,
                PostChoice::PlayAgain => self.launch(variant),
            },
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn menu_selection_wraps_and_launches() {
        let mut app = App::new();
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected_variant(), Variant::Catcher);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Running(Variant::Catcher));
        assert_eq!(app.take_pending(), Some(Variant::Catcher));
        assert_eq!(app.take_pending(), None);
    }

    #[test]
    fn finished_game_shows_score_and_keeps_best() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('2'));
        let v = app.take_pending().unwrap();
        app.finish(v, Ok(8));
        assert_eq!(app.screen, Screen::PostGame { variant: Variant::Eater, score: 8 });
        assert_eq!(app.best[Variant::Eater.index()], Some(8));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.post_choice, PostChoice::PlayAgain);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.take_pending(), Some(Variant::Eater));
        app.finish(Variant::Eater, Ok(3));
        assert_eq!(app.best[Variant::Eater.index()], Some(8));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Menu);
    }

    #[test]
    fn launch_error_becomes_banner() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('1'));
        let v = app.take_pending().unwrap();
        app.finish(v, Err(LaunchError::NotFound(PathBuf::from("nose-fruit"))));
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.banner.as_deref(), Some("Error: nose-fruit not found."));
        assert_eq!(app.best[Variant::Slicer.index()], None);

        press(&mut app, KeyCode::Char('3'));
        assert!(app.banner.is_none());
    }

    #[test]
    fn quit_from_menu() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
