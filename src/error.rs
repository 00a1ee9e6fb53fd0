/*
** Copyright (C) 2026 Sylvain Fargier
**
** This software is provided 'as-is', without any express or implied
** warranty.  In no event will the authors be held liable for any damages
** arising from the use of this software.
**
** Permission is granted to anyone to use this software for any purpose,
** including commercial applications, and to alter it and redistribute it
** freely, subject to the following restrictions:
**
** 1. The origin of this software must not be misrepresented; you must not
**    claim that you wrote the original software. If you use this software
**    in a product, an acknowledgment in the product documentation would be
**    appreciated but is not required.
** 2. Altered source versions must be plainly marked as such, and must not be
**    misrepresented as being the original software.
** 3. This notice may not be removed or altered from any source distribution.
**
** Created on: 2026-10-12T09:14:03
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use thiserror::Error;

/// Failures reported by [crate::ThreadHandle] and its collaborators
///
/// All failures are local and synchronous, nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Task binding rejected: owner dropped or operation missing
    #[error("invalid task: {0}")]
    InvalidTask(&'static str),

    /// Native thread creation failed
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Operation requires a live worker thread
    #[error("no running thread")]
    NotRunning,

    /// The operating system rejected the request
    #[error("os error: {0}")]
    Os(#[source] std::io::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Not available on this platform
    #[error("not supported on this platform")]
    Unsupported,

    /// Configuration could not be loaded
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            "invalid task: missing operation",
            Error::InvalidTask("missing operation").to_string()
        );
        assert_eq!("no running thread", Error::NotRunning.to_string());

        let err = Error::Spawn(std::io::Error::from(std::io::ErrorKind::OutOfMemory));
        assert!(err.to_string().starts_with("failed to spawn thread"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
