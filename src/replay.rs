//! Terminal replay of trace files written with `-v`.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Terminal;
use thiserror::Error;

use crate::trace::{DATA, END, STEP};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("trace has no steps")]
    NoSteps,
}

/// One step of a trace: the frame body and an optional side panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub data: String,
    pub meta: String,
}

pub fn parse_frames(log: &str) -> Result<Vec<Frame>, ReplayError> {
    let log = log.replace("\r\n", "\n");
    let body = log.split(END).next().unwrap_or_default();
    let frames: Vec<Frame> = body.split(STEP).skip(1).map(|frame| {
        let chomp = |s: &str| s.strip_suffix('\n').unwrap_or(s).to_owned();
        match frame.split_once(DATA) {
            Some((meta, data)) => Frame {data: chomp(data), meta: chomp(meta)},
            None => Frame {data: chomp(frame), meta: String::new()},
        }
    }).collect();
    if frames.is_empty() {return Err(ReplayError::NoSteps)}
    Ok(frames)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Back,
    First,
    Last,
    Stride(usize),
    StrideUp,
    StrideDown,
    TogglePause,
    ToggleHeat,
    Tick,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {return None}
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        Some(match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Left if ctrl => Action::First,
            KeyCode::Right if ctrl => Action::Last,
            KeyCode::Left => Action::Back,
            KeyCode::Right => Action::Forward,
            KeyCode::Char(digit @ '1' ..= '9') if alt => Action::Stride(digit as usize - '0' as usize),
            KeyCode::Up => Action::StrideUp,
            KeyCode::Down => Action::StrideDown,
            KeyCode::Char(' ') => Action::TogglePause,
            KeyCode::Char('h') => Action::ToggleHeat,
            _ => return None
        })
    }
}

#[derive(Debug)]
pub struct Viewer {
    frames: Vec<Frame>,
    /// 1-based.
    current: usize,
    stride: usize,
    paused: bool,
    heat: bool,
}

impl Viewer {
    /// `frames` must not be empty; [`parse_frames`] never returns an empty list.
    pub fn new(frames: Vec<Frame>, autoplay: bool, heat: bool) -> Self {
        Viewer {frames, current: 1, stride: 1, paused: !autoplay, heat}
    }

    pub fn current(&self) -> usize {self.current}
    pub fn stride(&self) -> usize {self.stride}
    pub fn is_paused(&self) -> bool {self.paused}
    pub fn shows_heat(&self) -> bool {self.heat}

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frames.get(self.current.checked_sub(1)?)
    }

    fn forward(&mut self) {
        self.current = (self.current + self.stride).min(self.frames.len());
        if self.current == self.frames.len() {self.paused = true}
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Forward => self.forward(),
            Action::Back => self.current = self.current.saturating_sub(self.stride).max(1),
            Action::First => self.current = 1,
            Action::Last => self.current = self.frames.len(),
            Action::Stride(stride) => self.stride = stride.max(1),
            Action::StrideUp => self.stride = match self.stride {1 => 5, 5 => 10, stride => stride + 10},
            Action::StrideDown => self.stride = match self.stride {
                10 => 5, 5 => 1,
                stride => stride.saturating_sub(10).max(1)
            },
            Action::TogglePause => self.paused = !self.paused,
            Action::ToggleHeat => self.heat = !self.heat,
            Action::Tick => if !self.paused {self.forward()},
            Action::Quit => ()
        }
    }

    /// Per byte of the current frame, how many of the last `max(20, stride)`
    /// frames differ there, ranked so the most-changed bytes are `1`.
    /// Unchanged bytes are `0`.
    pub fn heatmap(&self) -> Vec<usize> {
        let Some(frame) = self.frame() else {return Vec::new()};
        let current = frame.data.as_bytes();
        let from = self.current.saturating_sub(self.stride.max(20));
        let mut heat = vec![0; current.len()];
        for earlier in &self.frames[from .. self.current - 1] {
            let earlier = earlier.data.as_bytes();
            for (ix, byte) in current.iter().enumerate() {
                if earlier.get(ix) != Some(byte) {heat[ix] += 1}
            }
        }
        let max = heat.iter().copied().max().unwrap_or(0);
        for cell in heat.iter_mut().filter(|cell| **cell > 0) {
            *cell = max - *cell + 1;
        }
        heat
    }
}

/// Fully saturated colour with hue `min(280, (heat - 1) * 20)` degrees.
pub fn heat_color(heat: usize) -> Color {
    let hue = (heat.saturating_sub(1) * 20).min(280) as f64;
    let x = 1.0 - ((hue / 60.0) % 2.0 - 1.0).abs();
    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let channel = |value: f64| (value * 255.0).round() as u8;
    Color::Rgb(channel(r), channel(g), channel(b))
}

fn heat_lines(data: &str, heat: &[usize]) -> (Vec<Line<'static>>, Vec<Line<'static>>) {
    let mut cells = vec![Line::default()];
    let mut numbers = vec![String::new()];
    for (ix, ch) in data.char_indices() {
        if ch == '\n' {
            cells.push(Line::default());
            numbers.push(String::new());
            continue;
        }
        let cell_heat = heat.get(ix).copied().unwrap_or(0);
        let style = if cell_heat > 0 {Style::default().fg(heat_color(cell_heat))} else {Style::default()};
        if let Some(line) = cells.last_mut() {line.push_span(Span::styled(ch.to_string(), style))}
        if let Some(line) = numbers.last_mut() {line.push_str(&format!(" {:02}", cell_heat))}
    }
    (cells, numbers.into_iter().map(Line::from).collect())
}

fn draw(f: &mut ratatui::Frame, viewer: &Viewer) {
    let outer = Block::default().borders(Borders::ALL).border_type(BorderType::Double);
    let inner = outer.inner(f.area());
    f.render_widget(outer, f.area());
    let [header, body] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);

    let status = format!(
        "  Step(1-{}): {}    Paused: {}    Step Mod: {}",
        viewer.len(), viewer.current(), viewer.is_paused(), viewer.stride(),
    );
    f.render_widget(Paragraph::new(Span::styled(status, Style::default().add_modifier(Modifier::BOLD))), header);

    let Some(frame) = viewer.frame() else {return};
    let heat = viewer.heatmap();
    let (cells, numbers) = heat_lines(&frame.data, &heat);
    let width = frame.data.lines().map(str::len).max().unwrap_or(0) + 2;
    let [left, right] = Layout::horizontal([
        Constraint::Length(u16::try_from(width).unwrap_or(u16::MAX)),
        Constraint::Min(0),
    ]).areas(body);

    f.render_widget(Paragraph::new(cells), left);
    if viewer.shows_heat() {
        f.render_widget(Paragraph::new(numbers), right);
    } else if !frame.meta.is_empty() {
        f.render_widget(Paragraph::new(frame.meta.as_str()), right);
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, viewer: &mut Viewer, tick: Duration) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw(f, viewer))?;

        let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match Action::from_key(key) {
                    Some(Action::Quit) => return Ok(()),
                    Some(action) => viewer.apply(action),
                    None => ()
                }
            }
        }

        if last_tick.elapsed() >= tick {
            viewer.apply(Action::Tick);
            last_tick = Instant::now();
        }
    }
}

/// Takes over the terminal until the user quits; auto-play advances once per `tick`.
pub fn run_terminal(mut viewer: Viewer, tick: Duration) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut viewer, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn frames(data: &[&str]) -> Vec<Frame> {
        data.iter().map(|&data| Frame {data: data.to_owned(), meta: String::new()}).collect()
    }

    #[test]
    fn frames_split_on_markers() {
        let log = indoc! {"
            preamble
            ==========STEP==========
            ab
            cd
            ==========STEP==========
            side
            ==========DATA==========
            ef
            ==========END==========
            ==========STEP==========
            ignored
        "};
        let frames = parse_frames(log).unwrap();
        assert_eq!(frames, vec![
            Frame {data: "ab\ncd".into(), meta: String::new()},
            Frame {data: "ef".into(), meta: "side".into()},
        ]);
    }

    #[test]
    fn trace_without_steps_is_rejected() {
        assert!(matches!(parse_frames("just text\n"), Err(ReplayError::NoSteps)));
        assert!(matches!(parse_frames("==========END==========\n==========STEP==========\nx"), Err(ReplayError::NoSteps)));
    }

    #[test]
    fn forward_clamps_and_pauses_on_last_frame() {
        let mut viewer = Viewer::new(frames(&["a", "b", "c"]), true, false);
        viewer.apply(Action::Stride(5));
        viewer.apply(Action::Tick);
        assert_eq!(viewer.current(), 3);
        assert!(viewer.is_paused());
        viewer.apply(Action::Tick);
        assert_eq!(viewer.current(), 3);
        viewer.apply(Action::Back);
        assert_eq!(viewer.current(), 1);
    }

    #[test]
    fn stride_steps_up_and_down() {
        let mut viewer = Viewer::new(frames(&["a"]), false, false);
        let mut seen = Vec::new();
        for _ in 0 .. 3 {
            viewer.apply(Action::StrideUp);
            seen.push(viewer.stride());
        }
        for _ in 0 .. 4 {
            viewer.apply(Action::StrideDown);
            seen.push(viewer.stride());
        }
        assert_eq!(seen, vec![5, 10, 20, 10, 5, 1, 1]);
    }

    #[test]
    fn paused_viewer_ignores_ticks() {
        let mut viewer = Viewer::new(frames(&["a", "b"]), false, false);
        viewer.apply(Action::Tick);
        assert_eq!(viewer.current(), 1);
        viewer.apply(Action::Last);
        assert_eq!(viewer.frame().map(|frame| frame.data.as_str()), Some("b"));
    }

    #[test]
    fn heat_counts_recent_changes() {
        let mut viewer = Viewer::new(frames(&["ab", "xb", "xy"]), false, false);
        assert_eq!(viewer.heatmap(), vec![0, 0]);
        viewer.apply(Action::Last);
        assert_eq!(viewer.heatmap(), vec![2, 1]);
    }

    #[test]
    fn hottest_cells_are_red() {
        assert_eq!(heat_color(1), Color::Rgb(255, 0, 0));
        assert_eq!(heat_color(7), Color::Rgb(0, 255, 0));
        assert_eq!(heat_color(10), Color::Rgb(0, 255, 255));
        assert_eq!(heat_color(100), heat_color(15));
    }

    #[test]
    fn keys_map_to_actions() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(Action::from_key(key(KeyCode::Left, KeyModifiers::CONTROL)), Some(Action::First));
        assert_eq!(Action::from_key(key(KeyCode::Char('3'), KeyModifiers::ALT)), Some(Action::Stride(3)));
        assert_eq!(Action::from_key(key(KeyCode::Char('3'), KeyModifiers::NONE)), None);
        assert_eq!(Action::from_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Action::Quit));
    }
}
