//! Sequential pass over the banners collection.
//!
//! Connection failures abort the whole run; a failed single-document
//! write in apply mode is reported and the pass continues.

use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::time::Duration;

use crate::config::Config;
use crate::planner::{diff, plan_update};
use crate::uploads::UploadsRoot;

const COLLECTION: &str = "banners";

pub struct Migration {
    collection: Collection<Document>,
    uploads: UploadsRoot,
}

/// Outcome of a full pass.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub scanned: u64,
    pub changed: u64,
    pub write_failures: u64,
}

impl Migration {
    /// Connect to the database and open the uploads root.
    pub async fn connect(config: &Config) -> Result<Self> {
        let uploads = UploadsRoot::open(&config.uploads_dir)?;
        tracing::debug!(uploads_root = %uploads.path().display(), "uploads root opened");

        let mut options = ClientOptions::parse(&config.mongodb_uri)
            .await
            .context("failed to parse MongoDB connection string")?;
        options.app_name = Some("banner-migrate".to_string());
        options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(options).context("failed to create MongoDB client")?;
        let collection = client
            .database(&config.db_name)
            .collection::<Document>(COLLECTION);

        Ok(Self {
            collection,
            uploads,
        })
    }

    /// Scan every banner document, printing the planned field changes.
    /// With `apply` set, persist each plan as it is printed.
    pub async fn run(&self, apply: bool) -> Result<RunSummary> {
        let total = self
            .collection
            .count_documents(doc! {}, None)
            .await
            .context("failed to count banner documents")?;
        println!("Found {} banner documents", total);

        let mut summary = RunSummary::default();
        let mut cursor = self
            .collection
            .find(doc! {}, None)
            .await
            .context("failed to open banners cursor")?;

        while let Some(document) = cursor.try_next().await.context("banners cursor failed")? {
            summary.scanned += 1;

            let Some(plan) = plan_update(&document, &self.uploads) else {
                continue;
            };
            let set = diff(&document, &plan);
            if set.is_empty() {
                continue;
            }

            summary.changed += 1;
            let id = document.get("_id").cloned().unwrap_or(Bson::Null);
            println!("---");
            println!("Doc _id: {}", id);
            println!("Reason: {}", plan.reason);
            println!("Planned updates:");
            for (key, value) in set.iter() {
                println!("  {} -> {}", key, render(value));
            }

            if apply {
                match self
                    .collection
                    .update_one(doc! { "_id": id.clone() }, doc! { "$set": set }, None)
                    .await
                {
                    Ok(_) => println!("Applied"),
                    Err(e) => {
                        summary.write_failures += 1;
                        tracing::error!(doc_id = %id, error = %e, "failed to apply banner update");
                    }
                }
            }
        }

        println!("---");
        println!("Planned/Applied updates: {}", summary.changed);

        if summary.write_failures > 0 {
            tracing::warn!(
                failures = summary.write_failures,
                "some updates could not be applied"
            );
        }

        Ok(summary)
    }
}

fn render(value: &Bson) -> String {
    match value {
        Bson::Null => "null".to_string(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
