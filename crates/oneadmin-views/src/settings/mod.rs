//! Settings pages and the option bookkeeping they share.
//!
//! Options are a flat string map on the server. The pages keep the values
//! as loaded (`origin`) next to the edited ones so a grouped save only
//! sends what changed. Toggles flip and send immediately; the local copy
//! follows only once the gateway accepts the change.

pub mod operation;
pub mod system;

use std::collections::BTreeMap;

use oneadmin_api::option::OptionEntry;
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::AuthContext;
use tracing::debug;

use crate::context::Console;

pub use operation::OperationSettings;
pub use system::SystemSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTab {
    Personal,
    Operation,
    System,
}

impl SettingsTab {
    pub fn label(self) -> &'static str {
        match self {
            SettingsTab::Personal => "Personal Settings",
            SettingsTab::Operation => "Operation Settings",
            SettingsTab::System => "System Settings",
        }
    }
}

/// Tabs visible to the current user.
pub fn visible_tabs(auth: &AuthContext) -> Vec<SettingsTab> {
    let mut tabs = vec![SettingsTab::Personal];
    if auth.is_root() {
        tabs.push(SettingsTab::Operation);
        tabs.push(SettingsTab::System);
    }
    tabs
}

#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    values: BTreeMap<String, String>,
    origin: BTreeMap<String, String>,
}

impl OptionSet {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = OptionEntry>,
    {
        let values: BTreeMap<_, _> = entries.into_iter().map(|e| (e.key, e.value)).collect();
        Self {
            origin: values.clone(),
            values,
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key) == "true"
    }

    /// Local edit; nothing is sent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn changed(&self, key: &str) -> bool {
        self.values.get(key) != self.origin.get(key)
    }

    /// Records a value the gateway accepted.
    fn commit(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.origin.insert(key.to_string(), value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// PUTs one option and commits it locally on success.
pub(crate) async fn put_option(
    ctx: &Console,
    options: &mut OptionSet,
    key: &str,
    value: &str,
) -> Result<()> {
    debug!(key, "updating option");
    let result = ctx.api.update_option(key, value).await;
    ctx.report(result.map_err(ConsoleError::from))?;
    options.commit(key, value);
    Ok(())
}

/// Sends the flipped value of a boolean option.
pub(crate) async fn toggle_option(ctx: &Console, options: &mut OptionSet, key: &str) -> Result<bool> {
    let next = !options.get_bool(key);
    put_option(ctx, options, key, if next { "true" } else { "false" }).await?;
    Ok(next)
}

/// Sends `key` when its edited value differs from the loaded one.
pub(crate) async fn put_if_changed(ctx: &Console, options: &mut OptionSet, key: &str) -> Result<()> {
    if options.changed(key) {
        let value = options.get(key).to_string();
        put_option(ctx, options, key, &value).await?;
    }
    Ok(())
}

pub(crate) async fn load_options(ctx: &Console) -> Result<OptionSet> {
    ctx.auth.require_root()?;
    let result = ctx.api.list_options().await;
    let entries = ctx.report(result.map_err(ConsoleError::from))?;
    Ok(OptionSet::from_entries(entries))
}
