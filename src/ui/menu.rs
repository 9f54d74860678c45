use egui::{Align, CentralPanel, Context, Layout, RichText, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Launcher,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    Navigate(Transition),
    /// Back pressed on the launcher: leave the application.
    Exit,
}

/// Tracks which screen is showing. The launcher is the root.
#[derive(Debug)]
pub struct Navigator {
    current: Screen,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: Screen::Launcher,
        }
    }
}

impl Navigator {
    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn open(&mut self, to: Screen) -> Option<Transition> {
        if to == self.current {
            return None;
        }
        let from = std::mem::replace(&mut self.current, to);
        Some(Transition { from, to })
    }

    pub fn back(&mut self) -> BackAction {
        match self.current {
            Screen::Launcher => BackAction::Exit,
            Screen::Triangle => {
                self.current = Screen::Launcher;
                BackAction::Navigate(Transition {
                    from: Screen::Triangle,
                    to: Screen::Launcher,
                })
            }
        }
    }
}

/// Launcher screen: one button per demo.
#[derive(Debug)]
pub struct LauncherMenu {
    title: String,
}

impl LauncherMenu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Lays out the launcher; returns the screen the user picked this frame.
    pub fn show(&mut self, ctx: &Context) -> Option<Screen> {
        let mut picked = None;

        CentralPanel::default().show(ctx, |ui| {
            let available_size = ui.available_size();

            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space(available_size.y * 0.1);
                ui.heading(&self.title);
                ui.add_space(available_size.y * 0.15);

                let button = egui::Button::new(RichText::new("Triangle").size(20.0))
                    .min_size(Vec2::new(available_size.x * 0.5, 48.0));
                if ui.add(button).clicked() {
                    picked = Some(Screen::Triangle);
                }
            });
        });

        picked
    }
}
