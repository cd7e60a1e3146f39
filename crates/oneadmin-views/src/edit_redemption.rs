use std::path::{Path, PathBuf};

use oneadmin_api::redemption::RedemptionForm;
use oneadmin_core::{ConsoleError, Result};
use tracing::info;

use crate::context::{Console, Refresh};

pub const DEFAULT_REDEMPTION_QUOTA: i64 = 100_000;

/// Mints or edits redemption codes. Creating returns the fresh codes, which
/// can be exported as one text file per batch.
pub struct RedemptionEditor {
    ctx: Console,
    form: RedemptionForm,
    codes: Vec<String>,
    visible: bool,
}

impl RedemptionEditor {
    pub fn create(ctx: Console) -> Self {
        Self {
            ctx,
            form: RedemptionForm {
                id: None,
                name: String::new(),
                quota: DEFAULT_REDEMPTION_QUOTA,
                count: 1,
            },
            codes: Vec::new(),
            visible: true,
        }
    }

    pub async fn edit(ctx: Console, id: i64) -> Result<Self> {
        let result = ctx.api.get_redemption(id).await;
        let existing = ctx.report(result.map_err(ConsoleError::from))?;
        let mut editor = Self::create(ctx);
        editor.form = RedemptionForm {
            id: Some(id),
            name: existing.name,
            quota: existing.quota,
            count: 1,
        };
        Ok(editor)
    }

    pub fn form(&self) -> &RedemptionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RedemptionForm {
        &mut self.form
    }

    /// Codes minted by the last successful create.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub async fn submit(&mut self, parent: &mut impl Refresh) -> Result<()> {
        let is_edit = self.form.id.is_some();
        if !is_edit && self.form.name.trim().is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter a name!")));
        }
        if is_edit {
            let result = self.ctx.api.update_redemption(&self.form).await;
            self.ctx.report(result.map_err(ConsoleError::from))?;
            self.ctx
                .notifier
                .success("Redemption code updated successfully!");
        } else {
            let result = self.ctx.api.create_redemptions(&self.form).await;
            self.codes = self.ctx.report(result.map_err(ConsoleError::from))?;
            info!(name = %self.form.name, count = self.codes.len(), "redemption codes created");
            self.ctx
                .notifier
                .success("Redemption code created successfully!");
        }
        self.visible = false;
        parent.refresh().await
    }

    /// Writes the minted codes to `<dir>/<name>.txt`, one per line.
    pub fn export_codes(&self, dir: &Path) -> Result<PathBuf> {
        if self.codes.is_empty() {
            return Err(ConsoleError::validation("No redemption codes to export"));
        }
        let path = dir.join(format!("{}.txt", export_stem(&self.form.name)));
        std::fs::write(&path, self.codes.join("\n"))?;
        Ok(path)
    }
}

/// Batch name as a single file name: separators become `_` and leading
/// dots are dropped so the file always lands inside the export directory.
fn export_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "redemptions".to_string()
    } else {
        cleaned.to_string()
    }
}
