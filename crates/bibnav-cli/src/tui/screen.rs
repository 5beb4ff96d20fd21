use std::io;

use bibnav_engine::{Attr, DetailView, PromptStatus, Result, Screen, Surface, View};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use super::palette::Palette;

/// [`Screen`] drawing through a ratatui terminal.
pub struct TerminalScreen<B: Backend> {
    terminal: Terminal<B>,
    palette: Palette,
    /// Whether the terminal is the process's tty in raw mode, so that
    /// suspending has to hand it back.
    attached: bool,
}

impl<B: Backend> TerminalScreen<B> {
    pub fn new(terminal: Terminal<B>, palette: Palette) -> Self {
        Self {
            terminal,
            palette,
            attached: false,
        }
    }

    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> Screen for TerminalScreen<B> {
    fn size(&self) -> Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }

    fn present(&mut self, view: &View<'_>) -> Result<()> {
        let palette = &self.palette;
        self.terminal.draw(|frame| draw(frame, view, palette))?;
        Ok(())
    }

    fn suspend(&mut self) -> Result<()> {
        if self.attached {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, Show)?;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.attached {
            enable_raw_mode()?;
            execute!(io::stdout(), EnterAlternateScreen)?;
            self.terminal.clear()?;
        }
        Ok(())
    }
}

/// Lay out one frame: top status, viewport, bottom status and prompt line.
pub fn draw(frame: &mut ratatui::Frame<'_>, view: &View<'_>, palette: &Palette) {
    let [top, body, bottom, prompt] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(view.top_status).style(palette.top_statusbar),
        top,
    );

    let base = match view.state.detail_view() {
        Some(DetailView::Help) => palette.popup_help,
        _ => Style::default(),
    };
    let mut surface = BufferSurface {
        buffer: frame.buffer_mut(),
        area: body,
        palette,
        base,
    };
    view.render_viewport(&mut surface);

    frame.render_widget(
        Paragraph::new(view.bottom_status.as_str()).style(palette.bottom_statusbar),
        bottom,
    );

    match view.prompt {
        PromptStatus::Empty => {}
        PromptStatus::Editing { text, cursor } => {
            frame.render_widget(Paragraph::new(text.as_str()), prompt);
            let column = (*cursor).min(prompt.width.saturating_sub(1) as usize) as u16;
            frame.set_cursor_position((prompt.x + column, prompt.y));
        }
        PromptStatus::Message(text) => {
            frame.render_widget(Paragraph::new(text.as_str()).style(palette.popup_stdout), prompt);
        }
        PromptStatus::Error(text) => {
            frame.render_widget(Paragraph::new(text.as_str()).style(palette.popup_stderr), prompt);
        }
    }
}

/// The viewport area of a ratatui buffer.
struct BufferSurface<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    palette: &'a Palette,
    base: Style,
}

impl Surface for BufferSurface<'_> {
    fn clear(&mut self) {
        for y in self.area.top()..self.area.bottom() {
            for x in self.area.left()..self.area.right() {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_style(self.base);
                }
            }
        }
    }

    fn put(&mut self, row: usize, column: usize, text: &str, attr: Attr) {
        let (width, height) = (self.area.width as usize, self.area.height as usize);
        if row >= height || column >= width {
            return;
        }
        self.buffer.set_stringn(
            self.area.x + column as u16,
            self.area.y + row as u16,
            text,
            width - column,
            self.palette.style(attr),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibnav_engine::{
        CollaboratorError, Dispatcher, Event, KeyTable, Records, Request, Settings, TextBuffer,
    };
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;

    struct Titles(Vec<(&'static str, &'static str)>);

    impl Records for Titles {
        fn list(
            &mut self,
            _args: &[String],
            out: &mut TextBuffer,
        ) -> std::result::Result<Vec<String>, CollaboratorError> {
            for (label, title) in &self.0 {
                out.write(format!("{:<8}{}", label, title));
            }
            Ok(self.0.iter().map(|(label, _)| label.to_string()).collect())
        }

        fn execute(
            &mut self,
            request: &Request,
            _out: &mut TextBuffer,
        ) -> std::result::Result<usize, CollaboratorError> {
            Err(format!("{} is not supported", request.command).into())
        }
    }

    fn screen_and_dispatcher() -> (TerminalScreen<TestBackend>, Dispatcher<Titles>) {
        let terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let screen = TerminalScreen::new(terminal, Palette::default());

        let settings = Settings {
            version: "1.0".to_string(),
            prompt_before_quit: false,
            ..Settings::default()
        };
        let records = Titles(vec![("alpha", "Special relativity"), ("beta", "Quantum theory")]);
        let mut dispatcher = Dispatcher::new(records, KeyTable::with_defaults(), settings);
        dispatcher.start(40, 8);
        (screen, dispatcher)
    }

    fn row(screen: &TerminalScreen<TestBackend>, y: u16) -> String {
        let buffer = screen.terminal().backend().buffer();
        (0..buffer.area.width)
            .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_string()))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_frame_layout() {
        let (mut screen, dispatcher) = screen_and_dispatcher();

        screen.present(&dispatcher.view()).unwrap();

        assert_eq!(row(&screen, 0), "bibnav v1.0 - 2 Entries");
        assert_eq!(row(&screen, 1), "alpha   Special relativity");
        assert_eq!(row(&screen, 2), "beta    Quantum theory");
        assert!(row(&screen, 6).starts_with(":Prompt /:Search"));
        assert_eq!(row(&screen, 7), "");
    }

    #[test]
    fn test_cursor_line_uses_palette() {
        let (mut screen, dispatcher) = screen_and_dispatcher();

        screen.present(&dispatcher.view()).unwrap();

        let buffer = screen.terminal().backend().buffer();
        assert_eq!(buffer.cell((39, 1)).map(|c| c.bg), Some(Color::Cyan));
        assert_eq!(buffer.cell((0, 2)).map(|c| c.bg), Some(Color::Reset));
        assert_eq!(buffer.cell((0, 0)).map(|c| c.bg), Some(Color::Yellow));
    }

    #[test]
    fn test_errors_and_prompts_on_last_line() {
        let (mut screen, mut dispatcher) = screen_and_dispatcher();

        dispatcher
            .handle_event(Event::Key(bibnav_engine::Key::Char('d')), &mut screen)
            .unwrap();
        screen.present(&dispatcher.view()).unwrap();
        assert_eq!(row(&screen, 7), "delete is not supported");
        assert_eq!(
            screen.terminal().backend().buffer().cell((0, 7)).map(|c| c.bg),
            Some(Color::Red)
        );

        dispatcher
            .handle_event(Event::Key(bibnav_engine::Key::Char('/')), &mut screen)
            .unwrap();
        screen.present(&dispatcher.view()).unwrap();
        assert_eq!(row(&screen, 7), ":search");
    }
}
