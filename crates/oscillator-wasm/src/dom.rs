//! Page configuration and the DOM controls the widget binds to.

use oscillator::{Config, ConfigError, Field, Parameters, Readouts, format_number};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement};

use crate::error::MountError;

/// Attribute naming the parameter an input edits.
const FIELD_ATTRIBUTE: &str = "data-field";

/// Ids of the page elements the widget binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomIds {
    /// The drawing canvas.
    pub canvas: String,
    /// Numeric inputs. Each edits the field named by its `data-field`
    /// attribute, or by its id when the attribute is absent.
    pub inputs: Vec<String>,
    /// Angular frequency output.
    pub angular_frequency: String,
    /// Displacement output.
    pub displacement: String,
    /// Elapsed time output.
    pub elapsed_time: String,
    /// Oscillation count output.
    pub oscillation_count: String,
    /// Play/Stop button.
    pub toggle: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            canvas: "spring-pendulum".to_string(),
            inputs: Field::ALL.iter().map(|f| f.id().to_string()).collect(),
            angular_frequency: "w0".to_string(),
            displacement: "x".to_string(),
            elapsed_time: "t".to_string(),
            oscillation_count: "q".to_string(),
            toggle: "btn-toggle-animation".to_string(),
        }
    }
}

/// [`Config`] plus the element ids, as passed to `mount`.
///
/// The core settings sit at the top level of the JSON; ids go under `dom`:
///
/// ```json
/// { "fps": 30, "log_level": "debug", "dom": { "canvas": "my-canvas" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Simulation, layout and logging settings.
    #[serde(flatten)]
    pub core: Config,
    /// Element ids.
    pub dom: DomIds,
}

impl WidgetConfig {
    /// Parses and validates a config; `None` gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed JSON or invalid settings.
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        let Some(json) = json.filter(|j| !j.trim().is_empty()) else {
            return Ok(Self::default());
        };
        let config: Self = serde_json::from_str(json)?;
        config.core.validate()?;
        Ok(config)
    }
}

/// A numeric input and the parameter it edits.
#[derive(Debug, Clone)]
pub struct FieldInput {
    /// Edited parameter.
    pub field: Field,
    /// The control.
    pub element: HtmlInputElement,
}

/// Handles to every control outside the canvas.
#[derive(Debug, Clone)]
pub struct DomBindings {
    inputs: Vec<FieldInput>,
    angular_frequency: Element,
    displacement: Element,
    elapsed_time: Element,
    oscillation_count: Element,
    toggle: HtmlElement,
}

impl DomBindings {
    /// Looks up every control named in `ids`.
    ///
    /// # Errors
    ///
    /// Fails if an element is missing or of the wrong kind, or if an input
    /// names no known parameter.
    pub fn find(document: &Document, ids: &DomIds) -> Result<Self, MountError> {
        let inputs = ids
            .inputs
            .iter()
            .map(|id| {
                let element: HtmlInputElement = typed_element(document, id, "HTMLInputElement")?;
                let field_id = element
                    .get_attribute(FIELD_ATTRIBUTE)
                    .unwrap_or_else(|| element.id());
                let field: Field = field_id.parse()?;
                Ok(FieldInput { field, element })
            })
            .collect::<Result<Vec<_>, MountError>>()?;

        Ok(Self {
            inputs,
            angular_frequency: element(document, &ids.angular_frequency)?,
            displacement: element(document, &ids.displacement)?,
            elapsed_time: element(document, &ids.elapsed_time)?,
            oscillation_count: element(document, &ids.oscillation_count)?,
            toggle: typed_element(document, &ids.toggle, "HTMLElement")?,
        })
    }

    /// Bound inputs.
    pub fn inputs(&self) -> &[FieldInput] {
        &self.inputs
    }

    /// The Play/Stop control.
    pub fn toggle(&self) -> &HtmlElement {
        &self.toggle
    }

    /// Reads the starting parameters from the inputs.
    ///
    /// Inputs left empty take the value from `defaults` and are filled in
    /// with it.
    ///
    /// # Errors
    ///
    /// Returns the first input whose value is not a valid parameter.
    pub fn initial_parameters(&self, defaults: Parameters) -> Result<Parameters, MountError> {
        let mut params = defaults;
        for input in &self.inputs {
            let raw = input.element.value();
            if raw.trim().is_empty() {
                input
                    .element
                    .set_value(&format_number(params.get(input.field)));
                continue;
            }
            let value = input.field.parse_value(&raw)?;
            params = params.with(input.field, value)?;
        }
        debug!(
            mass = params.mass(),
            stiffness = params.stiffness(),
            initial_displacement = params.initial_displacement(),
            "initial parameters read"
        );
        Ok(params)
    }

    /// Writes the four output displays.
    pub fn write_readouts(&self, readouts: &Readouts) {
        self.angular_frequency
            .set_text_content(Some(&readouts.angular_frequency));
        self.displacement.set_text_content(Some(&readouts.displacement));
        self.elapsed_time.set_text_content(Some(&readouts.elapsed_time));
        self.oscillation_count
            .set_text_content(Some(&readouts.oscillation_count));
    }

    /// Enables or disables every input.
    pub fn set_inputs_locked(&self, locked: bool) {
        for input in &self.inputs {
            input.element.set_disabled(locked);
        }
    }

    /// Sets the toggle control's text.
    pub fn set_toggle_label(&self, label: &str) {
        self.toggle.set_text_content(Some(label));
    }

    /// Puts a parameter's current value back into its inputs.
    pub fn revert(&self, field: Field, params: &Parameters) {
        let value = format_number(params.get(field));
        for input in self.inputs.iter().filter(|i| i.field == field) {
            input.element.set_value(&value);
        }
    }
}

fn element(document: &Document, id: &str) -> Result<Element, MountError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| MountError::MissingElement(id.to_string()))
}

pub(crate) fn typed_element<T: JsCast>(
    document: &Document,
    id: &str,
    expected: &'static str,
) -> Result<T, MountError> {
    element(document, id)?
        .dyn_into::<T>()
        .map_err(|_| MountError::WrongElementType {
            id: id.to_string(),
            expected,
        })
}

/// The canvas named in `ids`.
///
/// # Errors
///
/// Fails if it is missing or not a canvas.
pub fn find_canvas(document: &Document, ids: &DomIds) -> Result<HtmlCanvasElement, MountError> {
    typed_element(document, &ids.canvas, "HTMLCanvasElement")
}
