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
** Created on: 2026-10-12T09:02:17
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

//! Single worker thread lifecycle manager
//!
//! A [ThreadHandle] binds an owner's operation to a background thread, and
//! offers start / stop / suspend / resume over it. Termination is
//! cooperative: the operation watches a [CancelSignal], [ThreadHandle::stop]
//! sets it and waits up to a timeout.

pub mod cancel;
pub use cancel::CancelSignal;

pub mod config;
pub use config::ThreadConfig;

pub mod error;
pub use error::Error;

pub mod priority;
pub use priority::Priority;

pub mod status;
pub use status::{State, StopStatus};

pub mod thread;
pub use thread::{EXIT_PANICKED, Operation, ThreadHandle};

pub mod utils;
