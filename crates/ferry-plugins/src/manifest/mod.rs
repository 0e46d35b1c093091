//! Plugin manifest types describing plugin identity, transport, and actions.
//!
//! A [`Plugin`] declares everything the host needs to reach an external
//! capability provider: its identity, how to launch it ([`Transport`]), the
//! [`Action`]s it offers, and free-form lifecycle hooks. Values are built once
//! by the [parser](crate::parser) and never mutated afterwards.

use std::collections::BTreeMap;

/// Transport kind for plugins launched as containers speaking JSON over stdio.
pub const DOCKER_STDIO: &str = "docker-stdio";

/// Output type whose response carries a markdown document.
pub const MARKDOWN_OUTPUT: &str = "markdown";

/// Output target that replaces the file submitted as input.
pub const OVERWRITE_INPUT: &str = "overwrite-input";

/// Describes how to launch a plugin process.
///
/// # Example
///
/// ```
/// use ferry_plugins::Transport;
///
/// let transport = Transport::docker("ghcr.io/acme/refiner:1")
///     .with_command(vec!["serve".into()]);
/// assert_eq!(transport.kind(), "docker-stdio");
/// assert_eq!(transport.command(), ["serve"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    kind: String,
    image: String,
    command: Vec<String>,
    env: BTreeMap<String, String>,
}

impl Transport {
    /// Creates a transport of an arbitrary kind.
    #[must_use]
    pub fn new(kind: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            image: image.into(),
            command: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Creates a `docker-stdio` transport for the given image.
    #[must_use]
    pub fn docker(image: impl Into<String>) -> Self {
        Self::new(DOCKER_STDIO, image)
    }

    /// Sets the arguments appended after the image reference.
    #[must_use]
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Sets the environment injected into the container.
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Returns the transport kind.
    #[must_use]
    pub const fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Returns the container image reference.
    #[must_use]
    pub const fn image(&self) -> &str {
        self.image.as_str()
    }

    /// Returns the command arguments.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Returns the container environment.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::docker("")
    }
}

/// An input declared by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInput {
    name: String,
    input_type: String,
    required: bool,
}

impl ActionInput {
    /// Creates an input declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, input_type: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            required,
        }
    }

    /// Returns the input name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the free-form input type, for example `text`.
    #[must_use]
    pub const fn input_type(&self) -> &str {
        self.input_type.as_str()
    }

    /// Returns whether the input must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }
}

/// Declares what to do with a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutput {
    output_type: String,
    target: String,
}

impl ActionOutput {
    /// Creates an output rule.
    #[must_use]
    pub fn new(output_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            output_type: output_type.into(),
            target: target.into(),
        }
    }

    /// Returns the output type, for example `markdown`.
    #[must_use]
    pub const fn output_type(&self) -> &str {
        self.output_type.as_str()
    }

    /// Returns the output target, for example `overwrite-input`.
    #[must_use]
    pub const fn target(&self) -> &str {
        self.target.as_str()
    }
}

/// A named capability exposed by a plugin.
///
/// # Example
///
/// ```
/// use ferry_plugins::{Action, ActionOutput};
///
/// let action = Action::new("refine")
///     .with_title("Refine context")
///     .with_output(ActionOutput::new("markdown", "overwrite-input"));
/// assert_eq!(action.key(), "refine");
/// assert!(action.output().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    key: String,
    title: String,
    description: String,
    inputs: Vec<ActionInput>,
    output: Option<ActionOutput>,
}

impl Action {
    /// Creates an action whose title defaults to its key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            title: key.clone(),
            key,
            description: String::new(),
            inputs: Vec::new(),
            output: None,
        }
    }

    /// Overrides the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares the accepted inputs.
    #[must_use]
    pub fn with_inputs(mut self, inputs: Vec<ActionInput>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Declares the output rule.
    #[must_use]
    pub fn with_output(mut self, output: ActionOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Returns the key used to resolve this action.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the display title.
    #[must_use]
    pub const fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the declared inputs.
    #[must_use]
    pub fn inputs(&self) -> &[ActionInput] {
        &self.inputs
    }

    /// Returns the output rule, if any.
    #[must_use]
    pub const fn output(&self) -> Option<&ActionOutput> {
        self.output.as_ref()
    }
}

/// Declarative description of a plugin.
///
/// # Example
///
/// ```
/// use ferry_plugins::{Action, Plugin, Transport};
///
/// let plugin = Plugin::new("writer", Transport::docker("acme/writer"))
///     .with_actions(vec![Action::new("refine")]);
/// assert_eq!(plugin.name(), "writer");
/// assert_eq!(plugin.version(), "0.0.0");
/// assert!(plugin.action("refine").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    id: String,
    name: String,
    version: String,
    transport: Transport,
    actions: Vec<Action>,
    hooks: BTreeMap<String, String>,
}

/// Version assumed when a manifest does not declare one.
pub const DEFAULT_VERSION: &str = "0.0.0";

impl Plugin {
    /// Creates a plugin whose name defaults to its identity.
    #[must_use]
    pub fn new(id: impl Into<String>, transport: Transport) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            version: String::from(DEFAULT_VERSION),
            transport,
            actions: Vec::new(),
            hooks: BTreeMap::new(),
        }
    }

    /// Overrides the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Declares the actions.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Declares lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: BTreeMap<String, String>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the unique identity.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the version string.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the transport descriptor.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns the actions in declaration order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the first action with the given key.
    #[must_use]
    pub fn action(&self, key: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.key() == key)
    }

    /// Returns the lifecycle hooks.
    #[must_use]
    pub const fn hooks(&self) -> &BTreeMap<String, String> {
        &self.hooks
    }
}

#[cfg(test)]
mod tests;
