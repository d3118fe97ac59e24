//! # Curation
//!
//! Flow behind `/api/curate-frame`.
//!
//! ## States
//! - Awaiting input: no commentary yet, resolve the cast author and prompt
//! - Submitted: commentary present, resolve curator and author, then store
//!
//! ## Ordering
//! 1. Target validation, before anything touches the network
//! 2. Profile lookups, curator first then author, stop on the first failure
//! 3. `next_id`, only once both profiles are in hand
//! 4. `put`, a failure here leaves a gap in the ids and is not rolled back
use chrono::{SecondsFormat, Utc};
use tracing::{error, info};

use crate::{
    database::{CurationRecord, CurationStore},
    error::AppError,
    models::FrameContext,
    profile::{Profile, ProfileLookupError, ProfileResolver},
    utils::{commentary, known_fid, validate_target},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parties {
    pub curator: Profile,
    pub caster: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurationOutcome {
    Prompt { caster: Profile },
    Curated { record: CurationRecord },
}

pub async fn resolve_parties(
    resolver: &dyn ProfileResolver,
    curator_fid: u64,
    caster_fid: u64,
) -> Result<Parties, ProfileLookupError> {
    let curator = resolver.resolve(curator_fid).await?;
    let caster = resolver.resolve(caster_fid).await?;

    Ok(Parties { curator, caster })
}

pub async fn handle_curation(
    context: &FrameContext,
    resolver: &dyn ProfileResolver,
    store: &dyn CurationStore,
) -> Result<CurationOutcome, AppError> {
    let target = validate_target(&context.cast_id)?;

    let Some(text) = commentary(context) else {
        let caster = resolver.resolve(target.fid).await?;

        return Ok(CurationOutcome::Prompt { caster });
    };

    let curator_fid = known_fid(context.fid).ok_or(ProfileLookupError::MissingFid)?;
    let Parties { curator, caster } = resolve_parties(resolver, curator_fid, target.fid).await?;

    let id = store.next_id().await?;
    let record = CurationRecord {
        id,
        text: text.to_string(),
        cast_id: target.hash,
        cast_fid: target.fid,
        curator_fid,
        curator_username: curator.username,
        caster_username: caster.username,
        caster_pfp_url: caster.pfp_url,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    store.put(id, &record).await.map_err(|e| {
        error!("Curation id {id} issued but not written: {e}");
        e
    })?;

    info!(
        "Stored curation {id} of cast {} by fid {}",
        record.cast_id, record.curator_fid
    );

    Ok(CurationOutcome::Curated { record })
}
