//! Leads collection: lead-generation form submissions and CSV export.

use crate::collection::{Collection, Document};
use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Lead form fields. `whatsapp` is optional and defaults to empty; the four
/// interest flags are stored as submitted ("yes"/"no").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    pub insurance: String,
    pub mutualfund: String,
    pub stockresearch: String,
    pub expertcall: String,
}

/// A persisted lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(flatten)]
    pub form: LeadForm,
    pub submitted_at: DateTime<Utc>,
}

impl Document for LeadRecord {
    const COLLECTION: &'static str = "leads";
}

pub struct LeadRepository {
    leads: Collection<LeadRecord>,
}

impl LeadRepository {
    pub fn open(dir: &Path) -> StoreResult<Self> {
        Ok(Self {
            leads: Collection::open_in(dir)?,
        })
    }

    /// Persist one submission as a single document.
    pub fn submit(&self, form: LeadForm) -> StoreResult<LeadRecord> {
        let record = LeadRecord {
            form,
            submitted_at: Utc::now(),
        };
        self.leads.insert(record.clone())?;
        tracing::info!(name = %record.form.name, "lead submitted");
        Ok(record)
    }

    pub fn all(&self) -> StoreResult<Vec<LeadRecord>> {
        self.leads.all()
    }

    pub fn count(&self) -> StoreResult<usize> {
        self.leads.len()
    }

    /// Write every lead as CSV with a header row. Returns the number of rows.
    pub fn export_csv<W: Write>(&self, writer: W) -> StoreResult<usize> {
        let leads = self.all()?;
        let mut out = csv::Writer::from_writer(writer);
        out.write_record([
            "name",
            "phone",
            "whatsapp",
            "insurance",
            "mutualfund",
            "stockresearch",
            "expertcall",
            "submitted_at",
        ])?;
        for lead in &leads {
            let f = &lead.form;
            let submitted_at = lead.submitted_at.to_rfc3339();
            out.write_record([
                f.name.as_str(),
                f.phone.as_str(),
                f.whatsapp.as_str(),
                f.insurance.as_str(),
                f.mutualfund.as_str(),
                f.stockresearch.as_str(),
                f.expertcall.as_str(),
                submitted_at.as_str(),
            ])?;
        }
        out.flush()?;
        Ok(leads.len())
    }
}
