//! Typed kube-scheduler flags and their resolution into an immutable model.
//!
//! Every flag the deployment knows about is declared once in [`SCHEDULER_OPTIONS`].
//! The order of that table is the order in which flags are rendered, so it must
//! never be derived from a hash map.
use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString, IntoStaticStr};

use crate::error::DeployError;

/// Declared type of a scheduler option.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Free-form text passed through verbatim.
    String,
    /// Signed decimal integer.
    Integer,
    /// Rendered as lowercase `true` / `false`.
    Boolean,
    /// Go-style duration such as `15s`, passed through verbatim.
    Duration,
}

/// Whether an option without a value is rendered or dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmitRule {
    /// Always rendered, falling back to the default.
    Always,
    /// Rendered only when the caller supplied a value.
    IfSet,
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(Cow<'static, str>),
}

impl OptionValue {
    /// Convenience constructor for owned text values.
    pub fn text(value: impl Into<String>) -> Self {
        OptionValue::Text(Cow::Owned(value.into()))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Int(value) => write!(f, "{value}"),
            OptionValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::text(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(Cow::Owned(value))
    }
}

/// Static description of one scheduler flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    /// Stable kebab-case identifier, e.g. `bind-pods-qps`.
    pub name: &'static str,
    /// Declared type.
    pub kind: OptionKind,
    /// Built-in default; `None` for options that are only passed when set.
    pub default: Option<OptionValue>,
    /// Emission policy for unset values.
    pub emit: EmitRule,
}

impl OptionSpec {
    const fn new(
        name: &'static str,
        kind: OptionKind,
        default: Option<OptionValue>,
        emit: EmitRule,
    ) -> Self {
        Self {
            name,
            kind,
            default,
            emit,
        }
    }

    /// Flag name as the daemon expects it, without the leading dashes.
    pub fn flag_name(&self) -> String {
        canonical_name(self.name)
    }

    /// Coerces a caller-supplied value into this option's declared type.
    fn coerce(&self, value: OptionValue) -> Result<OptionValue, DeployError> {
        let invalid = |value: &dyn fmt::Display| DeployError::InvalidOptionValue {
            name: self.name.to_string(),
            value: value.to_string(),
            expected: self.kind.into(),
        };

        match (self.kind, value) {
            (OptionKind::Integer, value @ OptionValue::Int(_)) => Ok(value),
            (OptionKind::Integer, OptionValue::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|_| invalid(&text)),
            (OptionKind::Boolean, value @ OptionValue::Bool(_)) => Ok(value),
            (OptionKind::Boolean, OptionValue::Text(text)) => match text.trim() {
                "true" => Ok(OptionValue::Bool(true)),
                "false" => Ok(OptionValue::Bool(false)),
                _ => Err(invalid(&text)),
            },
            (OptionKind::String | OptionKind::Duration, value @ OptionValue::Text(_)) => {
                Ok(value)
            }
            (OptionKind::String | OptionKind::Duration, other) => {
                Ok(OptionValue::text(other.to_string()))
            }
            (_, other) => Err(invalid(&other)),
        }
    }
}

const fn string(name: &'static str, default: &'static str) -> OptionSpec {
    OptionSpec::new(
        name,
        OptionKind::String,
        Some(OptionValue::Text(Cow::Borrowed(default))),
        EmitRule::Always,
    )
}

const fn duration(name: &'static str, default: &'static str) -> OptionSpec {
    OptionSpec::new(
        name,
        OptionKind::Duration,
        Some(OptionValue::Text(Cow::Borrowed(default))),
        EmitRule::Always,
    )
}

const fn integer(name: &'static str, default: i64) -> OptionSpec {
    OptionSpec::new(
        name,
        OptionKind::Integer,
        Some(OptionValue::Int(default)),
        EmitRule::Always,
    )
}

const fn boolean(name: &'static str, default: bool) -> OptionSpec {
    OptionSpec::new(
        name,
        OptionKind::Boolean,
        Some(OptionValue::Bool(default)),
        EmitRule::Always,
    )
}

const fn optional(name: &'static str) -> OptionSpec {
    OptionSpec::new(name, OptionKind::String, None, EmitRule::IfSet)
}

/// kube-scheduler command-line flags, in rendering order.
///
/// Reference: <http://kubernetes.io/docs/admin/kube-scheduler/>
pub static SCHEDULER_OPTIONS: &[OptionSpec] = &[
    string("address", "0.0.0.0"),
    string("algorithm-provider", "DefaultProvider"),
    integer("bind-pods-burst", 100),
    integer("bind-pods-qps", 50),
    string(
        "failure-domains",
        "kubernetes.io/hostname,failure-domain.beta.kubernetes.io/zone,failure-domain.beta.kubernetes.io/region",
    ),
    optional("feature-gates"),
    optional("google-json-key"),
    integer("hard-pod-affinity-symmetric-weight", 1),
    integer("kube-api-burst", 100),
    string("kube-api-content-type", "application/vnd.kubernetes.protobuf"),
    integer("kube-api-qps", 50),
    optional("kubeconfig"),
    boolean("leader-elect", true),
    duration("leader-elect-lease-duration", "15s"),
    duration("leader-elect-renew-deadline", "10s"),
    duration("leader-elect-retry-period", "2s"),
    duration("log-flush-frequency", "5s"),
    optional("master"),
    optional("policy-config-file"),
    integer("port", 10_251),
    boolean("profiling", true),
    string("scheduler-name", "default-scheduler"),
    integer("v", 0),
];

/// Normalises an identifier to kebab-case (`bind_pods_qps` -> `bind-pods-qps`).
pub fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

/// Looks up an option by name, accepting either snake_case or kebab-case.
pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
    let canonical = canonical_name(name);
    SCHEDULER_OPTIONS.iter().find(|spec| spec.name == canonical)
}

/// One option paired with its resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    /// The option this value belongs to.
    pub spec: &'static OptionSpec,
    /// Override if supplied, otherwise the default. `None` only for unset optional flags.
    pub value: Option<OptionValue>,
}

/// Immutable snapshot of every scheduler flag after overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    options: Vec<ResolvedOption>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_overrides(BTreeMap::new())
    }
}

impl DaemonConfig {
    /// Merges caller overrides onto the built-in defaults.
    ///
    /// Fails on the first unrecognised or ill-typed override; no partially
    /// resolved model is ever returned.
    pub fn resolve<I, K>(overrides: I) -> Result<Self, DeployError>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        let mut resolved: BTreeMap<&'static str, OptionValue> = BTreeMap::new();

        for (name, value) in overrides {
            let name = name.as_ref();
            let spec = lookup(name).ok_or_else(|| DeployError::UnknownOption {
                name: name.to_string(),
            })?;
            if resolved.contains_key(spec.name) {
                return Err(DeployError::DuplicateOption {
                    name: spec.name.to_string(),
                });
            }
            resolved.insert(spec.name, spec.coerce(value)?);
        }

        Ok(Self::from_overrides(resolved))
    }

    fn from_overrides(mut overrides: BTreeMap<&'static str, OptionValue>) -> Self {
        let options = SCHEDULER_OPTIONS
            .iter()
            .map(|spec| ResolvedOption {
                spec,
                value: overrides.remove(spec.name).or_else(|| spec.default.clone()),
            })
            .collect();
        Self { options }
    }

    /// Resolved options in declaration order.
    pub fn options(&self) -> &[ResolvedOption] {
        &self.options
    }

    /// Returns the resolved value for `name`, if the option exists and has one.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        let canonical = canonical_name(name);
        self.options
            .iter()
            .find(|option| option.spec.name == canonical)
            .and_then(|option| option.value.as_ref())
    }
}
