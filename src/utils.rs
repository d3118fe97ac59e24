use axum::body::Bytes;

use crate::{
    error::{AppError, InvalidTarget},
    models::{ABSENT_FID, CastId, FrameContext, FramePayload, Target},
};

pub fn get_context_from_body(body: Bytes) -> Result<FrameContext, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FrameContext::default());
    }

    let payload: FramePayload =
        serde_json::from_slice(&body).map_err(|_| AppError::MalformedPayload)?;

    let Some(data) = payload.untrusted_data else {
        return Ok(FrameContext::default());
    };

    let cast_id = data
        .cast_id
        .map(|raw| {
            let default = CastId::default();

            CastId {
                fid: raw.fid.unwrap_or(default.fid),
                hash: raw.hash.map(|hash| hash.into_string()).unwrap_or(default.hash),
            }
        })
        .unwrap_or_default();

    Ok(FrameContext {
        fid: data.fid.unwrap_or(ABSENT_FID),
        input_text: data.input_text,
        cast_id,
    })
}

pub fn validate_target(cast_id: &CastId) -> Result<Target, InvalidTarget> {
    let fid = known_fid(cast_id.fid).ok_or(InvalidTarget::MissingCastFid)?;

    let hash = cast_id.hash.trim();
    if is_absent_hash(hash) {
        return Err(InvalidTarget::MissingCastHash);
    }

    Ok(Target {
        fid,
        hash: hash.to_string(),
    })
}

fn is_absent_hash(hash: &str) -> bool {
    let digits = hash
        .strip_prefix("0x")
        .or_else(|| hash.strip_prefix("0X"))
        .unwrap_or(hash);

    digits.is_empty() || digits.bytes().all(|b| b == b'0')
}

/// Commentary as typed, if the user typed anything besides whitespace.
pub fn commentary(context: &FrameContext) -> Option<&str> {
    context
        .input_text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
}

pub fn known_fid(fid: i64) -> Option<u64> {
    u64::try_from(fid).ok().filter(|fid| *fid > 0)
}
