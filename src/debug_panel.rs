//! Debug control panel.
//!
//! A [`Panel`] binds primitive fields (material uniforms, shared cells, ad hoc
//! getter/setter pairs) to controllers. Writing a controller updates the bound
//! field immediately; reading it always reflects the field's current value, so
//! code that mutates the field directly never leaves the panel stale.
//!
//! The panel is driven from the keyboard:
//!
//! - `h` shows / hides the panel
//! - `Tab` moves the focus to the next visible controller
//! - `ArrowUp` / `ArrowDown` step the focused controller
//! - `1`..`9` open the n-th folder
//!
//! Every change is logged. [`Panel::overlay_text`] lays the panel out as text;
//! with the `ui` feature the engine draws it over the frame while the panel is
//! visible.

use std::{cell::Cell, fmt, rc::Rc};

use anyhow::{anyhow, bail};
use log::{info, warn};
use winit::keyboard::{Key, NamedKey};

use crate::data_structures::material::{Color, MaterialHandle, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Bool(bool),
    Color(Color),
    Choice(usize),
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Number(v) => write!(f, "{v}"),
            ControlValue::Bool(v) => write!(f, "{v}"),
            ControlValue::Color(c) => write!(f, "{c}"),
            ControlValue::Choice(i) => write!(f, "#{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider { min: f32, max: f32, step: f32 },
    Toggle,
    Color,
    /// Labelled choices; the bound value is the number next to the label.
    Options(Vec<(String, usize)>),
}

/// Component of a `Vec2` uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

type Getter = Box<dyn Fn() -> Option<ControlValue>>;
type Setter = Box<dyn Fn(ControlValue) -> bool>;
type Callback = Box<dyn FnMut(&ControlValue)>;

/// Where a controller reads and writes its value.
///
/// The getter returns `None` when the target is gone (e.g. a uniform removed
/// by a material rebuild); the setter returns `false` when it could not write.
pub struct Binding {
    get: Getter,
    set: Setter,
}

impl Binding {
    pub fn custom(
        get: impl Fn() -> Option<ControlValue> + 'static,
        set: impl Fn(ControlValue) -> bool + 'static,
    ) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// A float or colour uniform, looked up by name on every access.
    pub fn uniform(material: &MaterialHandle, name: &str) -> Self {
        let (read, write) = (material.clone(), material.clone());
        let (read_name, write_name) = (name.to_string(), name.to_string());
        Self::custom(
            move || match read.borrow().get(&read_name) {
                Some(UniformValue::Float(v)) => Some(ControlValue::Number(*v)),
                Some(UniformValue::Color(c)) => Some(ControlValue::Color(*c)),
                _ => None,
            },
            move |value| {
                let mut material = write.borrow_mut();
                match (material.get_mut(&write_name), value) {
                    (Some(UniformValue::Float(v)), ControlValue::Number(n)) => *v = n,
                    (Some(UniformValue::Color(c)), ControlValue::Color(n)) => *c = n,
                    _ => return false,
                }
                true
            },
        )
    }

    /// One component of a `Vec2` uniform.
    pub fn uniform_component(material: &MaterialHandle, name: &str, axis: Axis) -> Self {
        let (read, write) = (material.clone(), material.clone());
        let (read_name, write_name) = (name.to_string(), name.to_string());
        let index = match axis {
            Axis::X => 0,
            Axis::Y => 1,
        };
        Self::custom(
            move || {
                read.borrow()
                    .vec2(&read_name)
                    .map(|v| ControlValue::Number(v[index]))
            },
            move |value| {
                let mut material = write.borrow_mut();
                match (material.get_mut(&write_name), value) {
                    (Some(UniformValue::Vec2(v)), ControlValue::Number(n)) => {
                        v[index] = n;
                        true
                    }
                    _ => false,
                }
            },
        )
    }

    pub fn cell(cell: Rc<Cell<f32>>) -> Self {
        let write = cell.clone();
        Self::custom(
            move || Some(ControlValue::Number(cell.get())),
            move |value| match value {
                ControlValue::Number(n) => {
                    write.set(n);
                    true
                }
                _ => false,
            },
        )
    }

    pub fn flag(cell: Rc<Cell<bool>>) -> Self {
        let write = cell.clone();
        Self::custom(
            move || Some(ControlValue::Bool(cell.get())),
            move |value| match value {
                ControlValue::Bool(b) => {
                    write.set(b);
                    true
                }
                _ => false,
            },
        )
    }

    pub fn color_cell(cell: Rc<Cell<Color>>) -> Self {
        let write = cell.clone();
        Self::custom(
            move || Some(ControlValue::Color(cell.get())),
            move |value| match value {
                ControlValue::Color(c) => {
                    write.set(c);
                    true
                }
                _ => false,
            },
        )
    }

    pub fn choice(cell: Rc<Cell<usize>>) -> Self {
        let write = cell.clone();
        Self::custom(
            move || Some(ControlValue::Choice(cell.get())),
            move |value| match value {
                ControlValue::Choice(i) => {
                    write.set(i);
                    true
                }
                _ => false,
            },
        )
    }

    pub fn get(&self) -> Option<ControlValue> {
        (self.get)()
    }

    pub fn set(&self, value: ControlValue) -> bool {
        (self.set)(value)
    }
}

pub struct Controller {
    pub name: String,
    pub kind: ControlKind,
    binding: Binding,
    on_change: Option<Callback>,
    on_finish_change: Option<Callback>,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value())
            .finish()
    }
}

impl Controller {
    pub fn new(name: &str, kind: ControlKind, binding: Binding) -> Self {
        Self {
            name: name.to_string(),
            kind,
            binding,
            on_change: None,
            on_finish_change: None,
        }
    }

    pub fn slider(name: &str, binding: Binding, min: f32, max: f32, step: f32) -> Self {
        Self::new(name, ControlKind::Slider { min, max, step }, binding)
    }

    pub fn toggle(name: &str, binding: Binding) -> Self {
        Self::new(name, ControlKind::Toggle, binding)
    }

    pub fn color(name: &str, binding: Binding) -> Self {
        Self::new(name, ControlKind::Color, binding)
    }

    pub fn options(name: &str, binding: Binding, options: &[(&str, usize)]) -> Self {
        let options = options
            .iter()
            .map(|(label, value)| (label.to_string(), *value))
            .collect();
        Self::new(name, ControlKind::Options(options), binding)
    }

    /// Called after every change.
    pub fn on_change(mut self, f: impl FnMut(&ControlValue) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Called once a change is complete. Keyboard and programmatic changes
    /// complete immediately, so this runs right after `on_change`.
    pub fn on_finish_change(mut self, f: impl FnMut(&ControlValue) + 'static) -> Self {
        self.on_finish_change = Some(Box::new(f));
        self
    }

    /// The bound field's current value, `None` if it is gone.
    pub fn value(&self) -> Option<ControlValue> {
        self.binding.get()
    }

    /// `name: value` as shown in the overlay.
    pub fn label(&self) -> String {
        let value = match (&self.kind, self.value()) {
            (_, None) => "-".to_string(),
            (ControlKind::Options(options), Some(ControlValue::Choice(i))) => options
                .iter()
                .find(|(_, v)| *v == i)
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| format!("#{i}")),
            (_, Some(ControlValue::Number(v))) => format!("{v:.3}"),
            (_, Some(value)) => value.to_string(),
        };
        format!("{}: {}", self.name, value)
    }

    /// Write `value` to the bound field and fire the callbacks. Slider values
    /// are clamped to the range but otherwise written as given. Returns the
    /// value actually written.
    pub fn set_value(&mut self, value: ControlValue) -> anyhow::Result<ControlValue> {
        let value = self.sanitize(value)?;
        if !self.binding.set(value) {
            bail!("controller {} could not write its bound field", self.name);
        }
        info!("{} = {}", self.name, value);
        if let Some(f) = self.on_change.as_mut() {
            f(&value);
        }
        if let Some(f) = self.on_finish_change.as_mut() {
            f(&value);
        }
        Ok(value)
    }

    /// Keyboard step: sliders move by one step onto the step grid, toggles
    /// flip, options cycle. `up` is towards larger values.
    pub fn step(&mut self, up: bool) -> anyhow::Result<ControlValue> {
        let current = self
            .value()
            .ok_or_else(|| anyhow!("controller {} has nothing bound", self.name))?;
        let next = match (&self.kind, current) {
            (ControlKind::Slider { min, max, step }, ControlValue::Number(v)) => {
                let moved = if up { v + step } else { v - step };
                ControlValue::Number(snap(moved, *min, *max, *step))
            }
            (ControlKind::Toggle, ControlValue::Bool(b)) => ControlValue::Bool(!b),
            (ControlKind::Options(options), ControlValue::Choice(i)) => {
                if options.is_empty() {
                    bail!("controller {} has no options", self.name);
                }
                let position = options.iter().position(|(_, v)| *v == i).unwrap_or(0);
                let len = options.len();
                let next = if up {
                    (position + 1) % len
                } else {
                    (position + len - 1) % len
                };
                ControlValue::Choice(options[next].1)
            }
            (ControlKind::Color, _) => bail!("colour controller {} cannot be stepped", self.name),
            (kind, value) => bail!("{:?} controller holds unexpected value {:?}", kind, value),
        };
        self.set_value(next)
    }

    fn sanitize(&self, value: ControlValue) -> anyhow::Result<ControlValue> {
        match (&self.kind, value) {
            (ControlKind::Slider { min, max, .. }, ControlValue::Number(v)) => {
                Ok(ControlValue::Number(v.clamp(*min, *max)))
            }
            (ControlKind::Toggle, ControlValue::Bool(_)) | (ControlKind::Color, ControlValue::Color(_)) => {
                Ok(value)
            }
            (ControlKind::Options(options), ControlValue::Choice(i)) => {
                if options.iter().any(|(_, v)| *v == i) {
                    Ok(value)
                } else {
                    bail!("{} is not an option of controller {}", i, self.name)
                }
            }
            (kind, value) => bail!(
                "controller {} ({:?}) cannot take {:?}",
                self.name,
                kind,
                value
            ),
        }
    }
}

/// Clamp into `[min, max]` and move onto the nearest multiple of `step` from
/// `min`. Values already on the grid (within float noise) are kept as given.
fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let value = value.clamp(min, max);
    if step <= 0.0 {
        return value;
    }
    let steps = (value - min) / step;
    let nearest = steps.round();
    if (steps - nearest).abs() <= 1e-3 {
        return value;
    }
    (min + nearest * step).clamp(min, max)
}

#[derive(Debug)]
pub struct Folder {
    pub title: String,
    pub open: bool,
    pub controllers: Vec<Controller>,
}

impl Folder {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            open: false,
            controllers: Vec::new(),
        }
    }

    pub fn add(&mut self, controller: Controller) -> &mut Self {
        self.controllers.push(controller);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn controller_mut(&mut self, name: &str) -> Option<&mut Controller> {
        self.controllers.iter_mut().find(|c| c.name == name)
    }
}

/// What a key press did to the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    VisibilityChanged(bool),
    Focused(String),
    Changed(String, ControlValue),
    FolderOpened(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Focus {
    folder: Option<usize>,
    index: usize,
}

#[derive(Debug)]
pub struct Panel {
    pub title: String,
    pub folders: Vec<Folder>,
    pub controllers: Vec<Controller>,
    visible: bool,
    exclusive_folders: bool,
    focus: Option<Focus>,
}

impl Panel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            folders: Vec::new(),
            controllers: Vec::new(),
            visible: true,
            exclusive_folders: false,
            focus: None,
        }
    }

    /// Opening a folder closes every other folder.
    pub fn with_exclusive_folders(mut self) -> Self {
        self.exclusive_folders = true;
        self
    }

    pub fn add(&mut self, controller: Controller) -> &mut Self {
        self.controllers.push(controller);
        self
    }

    /// Add a closed folder, or return the existing one with that title.
    pub fn add_folder(&mut self, title: &str) -> &mut Folder {
        let idx = match self.folders.iter().position(|f| f.title == title) {
            Some(idx) => idx,
            None => {
                self.folders.push(Folder::new(title));
                self.folders.len() - 1
            }
        };
        &mut self.folders[idx]
    }

    pub fn folder(&self, title: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.title == title)
    }

    pub fn folder_mut(&mut self, title: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.title == title)
    }

    pub fn open_folders(&self) -> Vec<&str> {
        self.folders
            .iter()
            .filter(|f| f.open)
            .map(|f| f.title.as_str())
            .collect()
    }

    /// Open the folder called `title`. Returns the title if the folder was
    /// closed before, `None` if it was already open or does not exist.
    pub fn open_folder(&mut self, title: &str) -> Option<String> {
        let Some(idx) = self.folders.iter().position(|f| f.title == title) else {
            warn!("Panel {} has no folder called {}", self.title, title);
            return None;
        };
        let was_open = self.folders[idx].open;
        if self.exclusive_folders {
            for (i, folder) in self.folders.iter_mut().enumerate() {
                folder.open = i == idx;
            }
        } else {
            self.folders[idx].open = true;
        }
        self.drop_hidden_focus();
        if was_open {
            None
        } else {
            info!("Opened folder {}", title);
            Some(title.to_string())
        }
    }

    pub fn close_folder(&mut self, title: &str) {
        if let Some(folder) = self.folder_mut(title) {
            folder.open = false;
        }
        self.drop_hidden_focus();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        info!(
            "Panel {} {}",
            self.title,
            if self.visible { "shown" } else { "hidden" }
        );
        self.visible
    }

    /// Look up a controller at the root (`folder == None`) or in a folder.
    pub fn controller_mut(&mut self, folder: Option<&str>, name: &str) -> Option<&mut Controller> {
        match folder {
            None => self.controllers.iter_mut().find(|c| c.name == name),
            Some(title) => self.folder_mut(title)?.controller_mut(name),
        }
    }

    pub fn set_value(
        &mut self,
        folder: Option<&str>,
        name: &str,
        value: ControlValue,
    ) -> anyhow::Result<ControlValue> {
        self.controller_mut(folder, name)
            .ok_or_else(|| anyhow!("no controller {} in {:?}", name, folder))?
            .set_value(value)
    }

    /// The panel as text, one row per line: root controllers, then every
    /// folder with the controllers of open folders below it. `>` marks the
    /// focused row. `None` while the panel is hidden.
    pub fn overlay_text(&self) -> Option<String> {
        if !self.visible {
            return None;
        }
        let mut lines = vec![self.title.clone()];
        for (index, controller) in self.controllers.iter().enumerate() {
            lines.push(self.row(controller, Focus { folder: None, index }, "  "));
        }
        for (fi, folder) in self.folders.iter().enumerate() {
            let marker = if folder.open { '-' } else { '+' };
            let key = if fi < 9 { format!("[{}] ", fi + 1) } else { String::new() };
            lines.push(format!("  {marker} {key}{}", folder.title));
            if folder.open {
                for (index, controller) in folder.controllers.iter().enumerate() {
                    let at = Focus {
                        folder: Some(fi),
                        index,
                    };
                    lines.push(self.row(controller, at, "      "));
                }
            }
        }
        Some(lines.join("\n"))
    }

    fn row(&self, controller: &Controller, at: Focus, indent: &str) -> String {
        let cursor = if self.focus == Some(at) { ">" } else { " " };
        format!("{cursor}{indent}{}", controller.label())
    }

    /// Name of the focused controller, if any.
    pub fn focused(&self) -> Option<&str> {
        let focus = self.focus?;
        self.controller_at(focus).map(|c| c.name.as_str())
    }

    pub fn handle_key(&mut self, key: &Key) -> Option<PanelEvent> {
        match key {
            Key::Character(c) if c.as_str() == "h" || c.as_str() == "H" => {
                Some(PanelEvent::VisibilityChanged(self.toggle_visibility()))
            }
            _ if !self.visible => None,
            Key::Named(NamedKey::Tab) => self.focus_next().map(PanelEvent::Focused),
            Key::Named(NamedKey::ArrowUp) => self.step_focused(true),
            Key::Named(NamedKey::ArrowDown) => self.step_focused(false),
            Key::Character(c) => {
                let n = c.as_str().parse::<usize>().ok().filter(|n| (1..=9).contains(n))?;
                let title = self.folders.get(n - 1)?.title.clone();
                self.open_folder(&title).map(PanelEvent::FolderOpened)
            }
            _ => None,
        }
    }

    fn visible_controllers(&self) -> Vec<Focus> {
        let root = (0..self.controllers.len()).map(|index| Focus {
            folder: None,
            index,
        });
        let folders = self
            .folders
            .iter()
            .enumerate()
            .filter(|(_, f)| f.open)
            .flat_map(|(fi, f)| {
                (0..f.controllers.len()).map(move |index| Focus {
                    folder: Some(fi),
                    index,
                })
            });
        root.chain(folders).collect()
    }

    fn controller_at(&self, focus: Focus) -> Option<&Controller> {
        match focus.folder {
            None => self.controllers.get(focus.index),
            Some(fi) => self.folders.get(fi)?.controllers.get(focus.index),
        }
    }

    fn controller_at_mut(&mut self, focus: Focus) -> Option<&mut Controller> {
        match focus.folder {
            None => self.controllers.get_mut(focus.index),
            Some(fi) => self.folders.get_mut(fi)?.controllers.get_mut(focus.index),
        }
    }

    fn focus_next(&mut self) -> Option<String> {
        let visible = self.visible_controllers();
        if visible.is_empty() {
            self.focus = None;
            return None;
        }
        let next = match self
            .focus
            .and_then(|f| visible.iter().position(|v| *v == f))
        {
            Some(pos) => visible[(pos + 1) % visible.len()],
            None => visible[0],
        };
        self.focus = Some(next);
        let name = self.controller_at(next)?.name.clone();
        info!("Focused {}", name);
        Some(name)
    }

    fn step_focused(&mut self, up: bool) -> Option<PanelEvent> {
        let focus = self.focus?;
        let controller = self.controller_at_mut(focus)?;
        match controller.step(up) {
            Ok(value) => Some(PanelEvent::Changed(controller.name.clone(), value)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn drop_hidden_focus(&mut self) {
        if let Some(focus) = self.focus
            && !self.visible_controllers().contains(&focus)
        {
            self.focus = None;
        }
    }
}
