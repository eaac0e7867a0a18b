use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::actor::reactor::{Command, Direction};
use crate::model::TagSet;
use crate::model::tags::MAX_TAGS;

const MIN_MASTER_FACTOR: f64 = 0.1;
const MAX_MASTER_FACTOR: f64 = 0.9;

fn yes() -> bool { true }
fn default_border_width() -> u32 { 1 }
fn default_tag_count() -> u32 { 9 }
fn default_master_factor() -> f64 { 0.55 }
fn default_master_count() -> u32 { 1 }
fn default_layouts() -> Vec<LayoutMode> {
    vec![LayoutMode::Tile, LayoutMode::Floating, LayoutMode::Monocle]
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub rules: Vec<ClientRule>,
    #[serde(default)]
    pub monitor_rules: Vec<MonitorRule>,
    #[serde(default = "default_keys")]
    pub keys: Vec<KeyBinding>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    /// Number of usable tags, at most 31.
    #[serde(default = "default_tag_count")]
    pub tag_count: u32,
    /// Give keyboard focus to newly mapped clients.
    #[serde(default = "yes")]
    pub focus_on_map: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    Tile,
    Floating,
    Monocle,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Selectable layouts; the first two fill a new output's layout slots.
    #[serde(default = "default_layouts")]
    pub layouts: Vec<LayoutMode>,
    #[serde(default = "default_master_factor")]
    pub master_factor: f64,
    #[serde(default = "default_master_count")]
    pub master_count: u32,
}

/// Matches clients on map by substring of app id and title. A missing
/// pattern matches anything.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ClientRule {
    pub app_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub floating: bool,
    /// Index into the output list.
    pub output: Option<usize>,
}

/// Per-output overrides picked by output name substring. The first match
/// wins; a rule without a name matches every output.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct MonitorRule {
    pub name: Option<String>,
    #[serde(default = "default_master_factor")]
    pub master_factor: f64,
    #[serde(default = "default_master_count")]
    pub master_count: u32,
    /// Index into `layout.layouts`.
    #[serde(default)]
    pub layout: usize,
}

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[serde(transparent)]
    pub struct Modifiers: u32 {
        const SHIFT = 1;
        const CAPS = 2;
        const CTRL = 4;
        const ALT = 8;
        const MOD2 = 16;
        const MOD3 = 32;
        const LOGO = 64;
        const MOD5 = 128;
    }
}

impl Modifiers {
    /// Drops lock modifiers, which never take part in binding matches.
    pub fn clean(self) -> Modifiers { self - Modifiers::CAPS }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct KeyBinding {
    pub modifiers: Modifiers,
    /// An xkb keysym as delivered by the keyboard collaborator.
    pub keysym: u32,
    pub command: Command,
}

/// The combined effect of every rule matching a client.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RuleOutcome {
    pub tags: TagSet,
    pub floating: Option<bool>,
    pub output: Option<usize>,
}

mod keysym {
    pub const TAB: u32 = 0xff09;
    pub const SPACE: u32 = 0x0020;
    pub const COMMA: u32 = 0x002c;
    pub const PERIOD: u32 = 0x002e;
    pub const LESS: u32 = 0x003c;
    pub const GREATER: u32 = 0x003e;
    pub const DIGIT_0: u32 = 0x0030;
    pub const UPPER_Q: u32 = 0x0051;

    pub const fn lower(c: char) -> u32 { c as u32 }
}

fn default_keys() -> Vec<KeyBinding> {
    let logo = Modifiers::LOGO;
    let shift = Modifiers::LOGO | Modifiers::SHIFT;
    let ctrl = Modifiers::LOGO | Modifiers::CTRL;
    let ctrl_shift = Modifiers::LOGO | Modifiers::CTRL | Modifiers::SHIFT;
    let bind = |modifiers, keysym, command| KeyBinding { modifiers, keysym, command };

    let mut keys = vec![
        bind(logo, keysym::lower('j'), Command::FocusStack(Direction::Next)),
        bind(logo, keysym::lower('k'), Command::FocusStack(Direction::Prev)),
        bind(logo, keysym::lower('i'), Command::IncMaster(1)),
        bind(logo, keysym::lower('d'), Command::IncMaster(-1)),
        bind(logo, keysym::lower('h'), Command::SetMasterFactor(-0.05)),
        bind(logo, keysym::lower('l'), Command::SetMasterFactor(0.05)),
        bind(logo, keysym::TAB, Command::ViewPrevious),
        bind(logo, keysym::lower('t'), Command::SetLayout { output: None, index: Some(0) }),
        bind(logo, keysym::lower('f'), Command::SetLayout { output: None, index: Some(1) }),
        bind(logo, keysym::lower('m'), Command::SetLayout { output: None, index: Some(2) }),
        bind(logo, keysym::SPACE, Command::SetLayout { output: None, index: None }),
        bind(shift, keysym::SPACE, Command::ToggleFloating),
        bind(logo, keysym::lower('e'), Command::ToggleFullscreen),
        bind(logo, keysym::DIGIT_0, Command::View(TagSet::from_bits(!0))),
        bind(shift, keysym::DIGIT_0, Command::Tag(TagSet::from_bits(!0))),
        bind(logo, keysym::COMMA, Command::FocusOutput(Direction::Prev)),
        bind(logo, keysym::PERIOD, Command::FocusOutput(Direction::Next)),
        bind(shift, keysym::LESS, Command::TagOutput(Direction::Prev)),
        bind(shift, keysym::GREATER, Command::TagOutput(Direction::Next)),
        bind(shift, keysym::UPPER_Q, Command::Quit),
    ];
    for tag in 0..default_tag_count() {
        let sym = keysym::DIGIT_0 + 1 + tag;
        keys.push(bind(logo, sym, Command::View(TagSet::single(tag))));
        keys.push(bind(ctrl, sym, Command::ToggleView(tag)));
        keys.push(bind(shift, sym, Command::Tag(TagSet::single(tag))));
        keys.push(bind(ctrl_shift, sym, Command::ToggleTag { client: None, bit: tag }));
    }
    keys
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings: Settings::default(),
            layout: LayoutSettings::default(),
            rules: Vec::new(),
            monitor_rules: Vec::new(),
            keys: default_keys(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            border_width: default_border_width(),
            tag_count: default_tag_count(),
            focus_on_map: true,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            layouts: default_layouts(),
            master_factor: default_master_factor(),
            master_count: default_master_count(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.settings.validate());
        issues.extend(self.layout.validate());

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.app_id.is_none() && rule.title.is_none() {
                issues.push(format!("Client rule {} has no app_id or title and matches everything", index));
            }
            if !rule.tags.is_empty() && (rule.tags & self.tag_mask()).is_empty() {
                issues.push(format!(
                    "Client rule {} only names tags beyond tag_count {}",
                    index, self.settings.tag_count
                ));
            }
        }

        for (index, rule) in self.monitor_rules.iter().enumerate() {
            if !master_factor_in_range(rule.master_factor) {
                issues.push(format!(
                    "Monitor rule {} master_factor must be within [{}, {}], got {}",
                    index, MIN_MASTER_FACTOR, MAX_MASTER_FACTOR, rule.master_factor
                ));
            }
            if rule.layout >= self.layout.layouts.len() {
                issues.push(format!(
                    "Monitor rule {} references layout {} but only {} layouts are configured",
                    index,
                    rule.layout,
                    self.layout.layouts.len()
                ));
            }
        }

        let mut seen = crate::common::collections::HashSet::default();
        for binding in &self.keys {
            if !seen.insert((binding.modifiers.clean(), binding.keysym)) {
                issues.push(format!(
                    "Duplicate key binding {:?} + {:#x}",
                    binding.modifiers, binding.keysym
                ));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = self.settings.auto_fix_values() + self.layout.auto_fix_values();

        let tag_mask = self.tag_mask();
        for rule in &mut self.rules {
            let masked = rule.tags & tag_mask;
            if masked != rule.tags {
                rule.tags = masked;
                fixes += 1;
            }
        }

        let layout_count = self.layout.layouts.len();
        for rule in &mut self.monitor_rules {
            if !master_factor_in_range(rule.master_factor) {
                rule.master_factor = rule.master_factor.clamp(MIN_MASTER_FACTOR, MAX_MASTER_FACTOR);
                fixes += 1;
            }
            if rule.layout >= layout_count {
                rule.layout = 0;
                fixes += 1;
            }
        }

        fixes
    }

    /// Bits of every configured tag.
    pub fn tag_mask(&self) -> TagSet { TagSet::all(self.settings.tag_count) }

    pub fn match_rules(&self, app_id: Option<&str>, title: Option<&str>) -> RuleOutcome {
        let matches = |pattern: &Option<String>, value: Option<&str>| match pattern {
            None => true,
            Some(pattern) => value.is_some_and(|v| v.contains(pattern.as_str())),
        };
        let mut outcome = RuleOutcome::default();
        for rule in &self.rules {
            if matches(&rule.title, title) && matches(&rule.app_id, app_id) {
                outcome.floating = Some(rule.floating);
                outcome.tags = outcome.tags | rule.tags;
                if rule.output.is_some() {
                    outcome.output = rule.output;
                }
            }
        }
        outcome.tags = outcome.tags & self.tag_mask();
        outcome
    }

    pub fn monitor_rule(&self, output_name: &str) -> Option<&MonitorRule> {
        self.monitor_rules
            .iter()
            .find(|rule| rule.name.as_deref().is_none_or(|name| output_name.contains(name)))
    }

    pub fn binding(&self, modifiers: Modifiers, keysym: u32) -> Option<&Command> {
        let modifiers = modifiers.clean();
        self.keys
            .iter()
            .find(|binding| binding.modifiers.clean() == modifiers && binding.keysym == keysym)
            .map(|binding| &binding.command)
    }
}

fn master_factor_in_range(factor: f64) -> bool {
    (MIN_MASTER_FACTOR..=MAX_MASTER_FACTOR).contains(&factor)
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.tag_count == 0 || self.tag_count > MAX_TAGS {
            issues.push(format!(
                "tag_count must be within [1, {}], got {}",
                MAX_TAGS, self.tag_count
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.tag_count == 0 || self.tag_count > MAX_TAGS {
            self.tag_count = self.tag_count.clamp(1, MAX_TAGS);
            fixes += 1;
        }

        fixes
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.layouts.is_empty() {
            issues.push("at least one layout must be configured".to_string());
        }

        if !master_factor_in_range(self.master_factor) {
            issues.push(format!(
                "master_factor must be within [{}, {}], got {}",
                MIN_MASTER_FACTOR, MAX_MASTER_FACTOR, self.master_factor
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.layouts.is_empty() {
            self.layouts = default_layouts();
            fixes += 1;
        }

        if !master_factor_in_range(self.master_factor) {
            self.master_factor = default_master_factor();
            fixes += 1;
        }

        fixes
    }
}
