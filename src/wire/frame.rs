// This file is part of kvreactor.
// Copyright (C) 2026 kvreactor contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Request framing: `u32 LE total_len | u32 LE argc | argc * (u32 LE len ||
//! bytes)`.

/// Largest payload (after the outer length prefix) this server accepts,
/// for both requests and replies.
pub const MAX_MSG: usize = 4096;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame of {0} bytes exceeds the {MAX_MSG} byte limit")]
    TooLarge(usize),
    #[error("declared argument count or length runs past the frame")]
    Truncated,
    #[error("bytes remain after decoding the declared arguments")]
    Trailing,
}

/// Try to decode one complete frame from the front of `buf`.
///
/// Returns `Ok(None)` when `buf` doesn't yet hold a full frame (the caller
/// should read more and retry); `Ok(Some((args, consumed)))` on success,
/// where `consumed` is the number of leading bytes of `buf` the frame used;
/// `Err` on a malformed frame, which callers treat as fatal for the
/// connection.
pub fn try_decode(buf: &[u8]) -> Result<Option<(Vec<Vec<u8>>, usize)>, FrameError> {
    if buf.len() < 4 {
        return Ok(None);
    }
    let total_len = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    if total_len > MAX_MSG {
        return Err(FrameError::TooLarge(total_len));
    }
    if buf.len() < 4 + total_len {
        return Ok(None);
    }
    let payload = &buf[4..4 + total_len];
    if payload.len() < 4 {
        return Err(FrameError::Truncated);
    }
    let argc = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;
    if argc > MAX_MSG {
        return Err(FrameError::TooLarge(argc));
    }
    let mut args = Vec::with_capacity(argc);
    let mut pos = 4;
    for _ in 0..argc {
        if payload.len() < pos + 4 {
            return Err(FrameError::Truncated);
        }
        let arg_len = u32::from_le_bytes(payload[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        if payload.len() < pos + arg_len {
            return Err(FrameError::Truncated);
        }
        args.push(payload[pos..pos + arg_len].to_vec());
        pos += arg_len;
    }
    if pos != payload.len() {
        return Err(FrameError::Trailing);
    }
    Ok(Some((args, 4 + total_len)))
}

/// Encode a request frame from argument byte strings. Used by the
/// integration tests to drive the server as a real client would.
pub fn encode_request(args: &[&[u8]]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(args.len() as u32).to_le_bytes());
    for a in args {
        payload.extend_from_slice(&(a.len() as u32).to_le_bytes());
        payload.extend_from_slice(a);
    }
    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_complete_frame() {
        let frame = encode_request(&[b"SET", b"a", b"1"]);
        let (args, consumed) = try_decode(&frame).unwrap().unwrap();
        assert_eq!(consumed, frame.len());
        assert_eq!(args, vec![b"SET".to_vec(), b"a".to_vec(), b"1".to_vec()]);
    }

    #[test]
    fn reports_incomplete_for_a_partial_frame() {
        let frame = encode_request(&[b"GET", b"a"]);
        assert_eq!(try_decode(&frame[..frame.len() - 1]), Ok(None));
        assert_eq!(try_decode(&frame[..2]), Ok(None));
    }

    #[test]
    fn rejects_an_oversized_frame() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&((MAX_MSG as u32) + 1).to_le_bytes());
        assert_eq!(
            try_decode(&buf),
            Err(FrameError::TooLarge(MAX_MSG + 1))
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut frame = encode_request(&[b"GET", b"a"]);
        // Bump the declared total length to include one extra byte, but
        // without growing argc — the extra byte is trailing garbage.
        let new_total = (frame.len() - 4 + 1) as u32;
        frame[0..4].copy_from_slice(&new_total.to_le_bytes());
        frame.push(0xff);
        assert_eq!(try_decode(&frame), Err(FrameError::Trailing));
    }

    #[test]
    fn rejects_a_length_that_runs_past_the_payload() {
        let mut buf = Vec::new();
        let payload = {
            let mut p = Vec::new();
            p.extend_from_slice(&1u32.to_le_bytes()); // argc = 1
            p.extend_from_slice(&100u32.to_le_bytes()); // arg_len = 100, but no bytes follow
            p
        };
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&payload);
        assert_eq!(try_decode(&buf), Err(FrameError::Truncated));
    }

    #[test]
    fn multiple_frames_decode_independently_from_a_stream() {
        let mut stream = encode_request(&[b"A"]);
        stream.extend(encode_request(&[b"BB"]));
        let (first, consumed1) = try_decode(&stream).unwrap().unwrap();
        assert_eq!(first, vec![b"A".to_vec()]);
        let (second, consumed2) = try_decode(&stream[consumed1..]).unwrap().unwrap();
        assert_eq!(second, vec![b"BB".to_vec()]);
        assert_eq!(consumed1 + consumed2, stream.len());
    }
}
