// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Transport definition for MEP devices

use super::error::Error;

/// An abstract transaction channel to a sign.
///
/// A request frame goes out, the matching response frame comes back. The
/// codec hands implementors complete frames and expects complete frames in
/// return; stream framing, timeouts, retries and reconnection all live
/// behind this trait.
///
/// ## How can I implement `Transport`?
///
/// Write the request bytes untouched, then recover exactly one frame from
/// the stream: UoPTB frames end at their ETX delimiter, PPTP frames
/// declare their payload length in the first two bytes.
pub trait Transport {
    /// Sends a frame to the device and returns the response frame.
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>, Error>;
}
