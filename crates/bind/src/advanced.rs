//! Data-driven "advanced" preferences
//!
//! Rows of the advanced page are described in TOML rather than wired by
//! hand:
//!
//! ```toml
//! [[option]]
//! field = "scroll_to_action"
//! name = "Scroll to action"
//! type = "toggle"
//! default = true
//!
//! [[option]]
//! field = "chat_lines"
//! name = "Chat lines"
//! type = "slider"
//! min = 1
//! max = 20
//! default = 6
//!
//! [[option]]
//! field = "joystick_support"
//! name = "Joystick"
//! type = "combo"
//! default = "off"
//!
//! [[option.choice]]
//! id = "off"
//! name = "Off"
//! ```
//!
//! `field` is both the store key and the control id. `special` rows open a
//! dedicated dialog and are not bound.

use serde::Deserialize;

use prefkit_store::PreferenceStoreExt;

use crate::control::Capability;
use crate::error::BindError;
use crate::field::Field;
use crate::registry::{BindingRegistry, EnumOption};
use crate::tree::ControlTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboChoice {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvancedKind {
    Toggle { default: bool },
    Slider { min: i64, max: i64, step: i64, default: i64 },
    Combo { choices: Vec<ComboChoice>, default: String },
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedOption {
    pub field: String,
    pub name: String,
    pub description: String,
    pub kind: AdvancedKind,
}

// ============================================================================
// TOML form
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawFile {
    #[serde(default)]
    option: Vec<RawOption>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Toggle,
    Slider,
    Combo,
    Special,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    field: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    kind: RawKind,
    default: Option<toml::Value>,
    min: Option<i64>,
    max: Option<i64>,
    step: Option<i64>,
    #[serde(default)]
    choice: Vec<RawChoice>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

fn invalid(field: &str, msg: impl std::fmt::Display) -> BindError {
    BindError::Config(format!("option '{field}': {msg}"))
}

impl RawOption {
    fn validate(self) -> Result<AdvancedOption, BindError> {
        let field = self.field;
        if field.is_empty() {
            return Err(BindError::Config("option with empty field".into()));
        }

        let kind = match self.kind {
            RawKind::Toggle => {
                let default = match self.default {
                    None => false,
                    Some(toml::Value::Boolean(b)) => b,
                    Some(other) => {
                        return Err(invalid(&field, format!("toggle default must be a boolean, got {other}")));
                    }
                };
                AdvancedKind::Toggle { default }
            }
            RawKind::Slider => {
                let (Some(min), Some(max)) = (self.min, self.max) else {
                    return Err(invalid(&field, "slider needs min and max"));
                };
                if min > max {
                    return Err(invalid(&field, format!("min {min} is greater than max {max}")));
                }
                let step = self.step.unwrap_or(1);
                if step < 1 {
                    return Err(invalid(&field, format!("step must be positive, got {step}")));
                }
                let default = match self.default {
                    None => min,
                    Some(toml::Value::Integer(n)) => n,
                    Some(other) => {
                        return Err(invalid(&field, format!("slider default must be an integer, got {other}")));
                    }
                };
                if !(min..=max).contains(&default) {
                    return Err(invalid(&field, format!("default {default} outside {min}..={max}")));
                }
                AdvancedKind::Slider { min, max, step, default }
            }
            RawKind::Combo => {
                if self.choice.is_empty() {
                    return Err(invalid(&field, "combo needs at least one choice"));
                }
                let choices: Vec<ComboChoice> = self
                    .choice
                    .into_iter()
                    .map(|c| ComboChoice { id: c.id, name: c.name, description: c.description })
                    .collect();
                let default = match self.default {
                    None => choices[0].id.clone(),
                    Some(toml::Value::String(s)) => s,
                    Some(other) => {
                        return Err(invalid(&field, format!("combo default must be a string, got {other}")));
                    }
                };
                if !choices.iter().any(|c| c.id == default) {
                    return Err(invalid(&field, format!("default '{default}' is not a choice")));
                }
                AdvancedKind::Combo { choices, default }
            }
            RawKind::Special => AdvancedKind::Special,
        };

        Ok(AdvancedOption { field, name: self.name, description: self.description, kind })
    }
}

impl AdvancedOption {
    /// Parse and validate a list of options. Fields must be unique.
    pub fn list_from_toml(content: &str) -> Result<Vec<AdvancedOption>, BindError> {
        let raw: RawFile = toml::from_str(content).map_err(|e| BindError::Config(e.to_string()))?;

        let mut options: Vec<AdvancedOption> = Vec::with_capacity(raw.option.len());
        for raw in raw.option {
            let option = raw.validate()?;
            if options.iter().any(|o| o.field == option.field) {
                return Err(invalid(&option.field, "defined twice"));
            }
            options.push(option);
        }
        Ok(options)
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, AdvancedKind::Special)
    }
}

impl BindingRegistry {
    /// Bind each non-special option to the control named by its `field`,
    /// reading and writing the store directly. Returns how many were bound.
    ///
    /// A stored slider value outside the range, or a stored combo id that
    /// is not a choice, loads the option's default instead.
    ///
    /// Every control is resolved before anything is bound, so an error
    /// leaves the registry untouched.
    pub fn register_advanced(
        &mut self,
        tree: &ControlTree,
        options: &[AdvancedOption],
    ) -> Result<usize, BindError> {
        let mut seen: Vec<&str> = Vec::with_capacity(options.len());
        for option in options {
            let capability = match &option.kind {
                AdvancedKind::Toggle { .. } => Capability::Boolean,
                AdvancedKind::Slider { .. } => Capability::Integer,
                AdvancedKind::Combo { choices, .. } => {
                    if choices.is_empty() {
                        log::error!("advanced option '{}': no choices", option.field);
                        return Err(BindError::EmptyOptions { id: option.field.clone() });
                    }
                    Capability::Index
                }
                AdvancedKind::Special => continue,
            };
            if seen.contains(&option.field.as_str()) {
                log::error!("advanced option '{}' bound twice", option.field);
                return Err(invalid(&option.field, "defined twice"));
            }
            seen.push(&option.field);
            tree.find_with(&option.field, capability)?;
        }

        let mut bound = 0;
        for option in options {
            let key = option.field.clone();
            match &option.kind {
                AdvancedKind::Toggle { default } => {
                    let field = Field::stored(self.store().clone(), &key, *default);
                    self.register_boolean(tree, &key, field)?;
                }
                AdvancedKind::Slider { min, max, step, default } => {
                    let control = tree.find_with(&key, Capability::Integer)?;
                    if let Some(slider) = control.borrow_mut().as_integer_mut() {
                        slider.set_range(*min, *max);
                        slider.set_step(*step);
                    }

                    let (min, max, default) = (*min, *max, *default);
                    let read_store = self.store().clone();
                    let write_store = self.store().clone();
                    let read_key = key.clone();
                    let write_key = key.clone();
                    let field = Field::new(
                        move || {
                            let value = read_store.borrow().get_int(&read_key, default);
                            if (min..=max).contains(&value) {
                                value
                            } else {
                                log::warn!(
                                    "'{read_key}': stored {value} outside {min}..={max}; using {default}"
                                );
                                default
                            }
                        },
                        move |value: i64| write_store.borrow_mut().set_typed(&write_key, value),
                    );
                    self.register_integer(tree, &key, field)?;
                }
                AdvancedKind::Combo { choices, default } => {
                    let ids: Vec<String> = choices.iter().map(|c| c.id.clone()).collect();
                    let read_store = self.store().clone();
                    let write_store = self.store().clone();
                    let read_key = key.clone();
                    let write_key = key.clone();
                    let default = default.clone();
                    let field = Field::new(
                        move || {
                            let value = read_store.borrow().get_choice(&read_key, &default);
                            if ids.contains(&value) {
                                value
                            } else {
                                log::warn!(
                                    "'{read_key}': stored '{value}' is not a choice; using '{default}'"
                                );
                                default.clone()
                            }
                        },
                        move |value: String| write_store.borrow_mut().set_typed(&write_key, value),
                    );

                    let entries = choices
                        .iter()
                        .map(|c| {
                            let entry = EnumOption::new(c.id.clone(), c.name.clone());
                            if c.description.is_empty() {
                                entry
                            } else {
                                entry.with_details(c.description.clone())
                            }
                        })
                        .collect();
                    self.register_enum(tree, &key, entries, field)?;
                }
                AdvancedKind::Special => {
                    log::debug!("advanced option '{key}' is special; not bound");
                    continue;
                }
            }
            bound += 1;
        }
        Ok(bound)
    }
}
