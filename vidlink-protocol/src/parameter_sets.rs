//! ## vidlink-protocol::parameter_sets
//! Locates the SPS and PPS units inside Annex-B formatted NAL data.
//!
//! The scan slides over the buffer looking for `00 00 00 01` start codes. It
//! expects an SPS unit (type nibble `0x7`), then a PPS unit (type nibble
//! `0x8`), then any further start code or the end of the buffer, which closes
//! the PPS. Positions that do not advance the scan are skipped.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::error::ExtractionError;
use crate::packet::owned_copy;

/// Annex-B four-byte start code.
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

pub const NAL_TYPE_SPS: u8 = 0x07;
pub const NAL_TYPE_PPS: u8 = 0x08;

/// The type nibble is read from the low four bits of the unit's header byte.
const NAL_TYPE_MASK: u8 = 0x0F;

/// Sequence and picture parameter sets copied out of a packet.
///
/// `sps` and `pps` hold the unit bodies, without start code or header byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSets {
    pub sps: Bytes,
    pub pps: Bytes,
    /// Header byte that preceded the SPS body.
    pub sps_header: u8,
    /// Header byte that preceded the PPS body.
    pub pps_header: u8,
}

impl ParameterSets {
    /// The SPS body immediately followed by the PPS body.
    pub fn joined(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.sps.len() + self.pps.len());
        out.put_slice(&self.sps);
        out.put_slice(&self.pps);
        out.freeze()
    }

    /// Both units re-framed as an Annex-B byte stream, ready to prime a decoder.
    pub fn to_annex_b(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(2 * (START_CODE.len() + 1) + self.sps.len() + self.pps.len());
        out.put_slice(&START_CODE);
        out.put_u8(self.sps_header);
        out.put_slice(&self.sps);
        out.put_slice(&START_CODE);
        out.put_u8(self.pps_header);
        out.put_slice(&self.pps);
        out.freeze()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingSps,
    SeekingPps {
        sps_offset: usize,
    },
    SeekingPpsEnd {
        sps_offset: usize,
        sps_size: usize,
        pps_offset: usize,
    },
    Success {
        sps_offset: usize,
        sps_size: usize,
        pps_offset: usize,
        pps_size: usize,
    },
    Failed,
}

/// True when the four bytes ending just before `i` are a start code.
fn start_code_before(data: &[u8], i: usize) -> bool {
    i.checked_sub(START_CODE.len())
        .and_then(|start| data.get(start..i))
        .is_some_and(|window| window == START_CODE)
}

fn unit_type_at(data: &[u8], i: usize) -> Option<u8> {
    data.get(i).map(|b| b & NAL_TYPE_MASK)
}

fn advance(state: ScanState, data: &[u8], i: usize) -> ScanState {
    if !start_code_before(data, i) {
        return state;
    }
    let code_start = i - START_CODE.len();
    match state {
        ScanState::SeekingSps if unit_type_at(data, i) == Some(NAL_TYPE_SPS) => {
            ScanState::SeekingPps { sps_offset: i + 1 }
        }
        ScanState::SeekingPps { sps_offset } if unit_type_at(data, i) == Some(NAL_TYPE_PPS) => {
            match code_start.checked_sub(sps_offset) {
                Some(sps_size) => ScanState::SeekingPpsEnd {
                    sps_offset,
                    sps_size,
                    pps_offset: i + 1,
                },
                None => state,
            }
        }
        ScanState::SeekingPpsEnd {
            sps_offset,
            sps_size,
            pps_offset,
        } => match code_start.checked_sub(pps_offset) {
            Some(pps_size) => ScanState::Success {
                sps_offset,
                sps_size,
                pps_offset,
                pps_size,
            },
            None => state,
        },
        other => other,
    }
}

fn scan(data: &[u8]) -> ScanState {
    let mut state = ScanState::SeekingSps;
    for i in START_CODE.len()..=data.len() {
        state = advance(state, data, i);
        if matches!(state, ScanState::Success { .. }) {
            return state;
        }
    }
    match state {
        // The PPS runs to the end of the buffer.
        ScanState::SeekingPpsEnd {
            sps_offset,
            sps_size,
            pps_offset,
        } => ScanState::Success {
            sps_offset,
            sps_size,
            pps_offset,
            pps_size: data.len().saturating_sub(pps_offset),
        },
        ScanState::Success { .. } => state,
        _ => ScanState::Failed,
    }
}

fn copy_unit(data: &[u8], offset: usize, size: usize) -> Result<Bytes, ExtractionError> {
    let end = offset.checked_add(size).ok_or(ExtractionError::NotFound)?;
    let unit = data.get(offset..end).ok_or(ExtractionError::NotFound)?;
    owned_copy(unit).map_err(|_| ExtractionError::ResourceExhausted { requested: size })
}

/// Extracts the first SPS/PPS pair from `nal_data`.
///
/// Only pass data from packets whose trailer has been verified.
pub fn extract_parameter_sets(nal_data: &[u8]) -> Result<ParameterSets, ExtractionError> {
    let ScanState::Success {
        sps_offset,
        sps_size,
        pps_offset,
        pps_size,
    } = scan(nal_data)
    else {
        return Err(ExtractionError::NotFound);
    };

    let sets = ParameterSets {
        sps: copy_unit(nal_data, sps_offset, sps_size)?,
        pps: copy_unit(nal_data, pps_offset, pps_size)?,
        sps_header: nal_data[sps_offset - 1],
        pps_header: nal_data[pps_offset - 1],
    };
    debug!(
        sps = %hex::encode(&sets.sps),
        pps = %hex::encode(&sets.pps),
        "Found parameter sets"
    );
    Ok(sets)
}
