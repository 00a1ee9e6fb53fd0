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
** Created on: 2026-10-14T14:05:37
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::sync::{Arc, Weak};

use crate::error::{Error, Result};

/// Operation run on the worker thread
///
/// Usually an owner's method, `fn work(&self, param: Option<&P>) -> i32`,
/// its return value becomes the thread exit code.
pub type Operation<T, P> = fn(&T, Option<&P>) -> i32;

/// (owner, operation, parameter) triple
pub(crate) struct Binding<T, P> {
    owner: Weak<T>,
    operation: Operation<T, P>,
    parameter: Option<Arc<P>>,
}

impl<T, P> Clone for Binding<T, P> {
    fn clone(&self) -> Self {
        Self {
            owner: Weak::clone(&self.owner),
            operation: self.operation,
            parameter: self.parameter.clone(),
        }
    }
}

impl<T, P> Binding<T, P> {
    pub fn new(
        owner: Weak<T>,
        operation: Option<Operation<T, P>>,
        parameter: Option<Arc<P>>,
    ) -> Result<Self> {
        let operation = operation.ok_or(Error::InvalidTask("missing operation"))?;
        if owner.strong_count() == 0 {
            return Err(Error::InvalidTask("missing owner"));
        }
        Ok(Self {
            owner,
            operation,
            parameter,
        })
    }

    /// Run the operation on the owner
    ///
    /// Returns `None` when the owner has been dropped in the meantime.
    pub fn invoke(&self) -> Option<i32> {
        let owner = self.owner.upgrade()?;
        Some((self.operation)(&owner, self.parameter.as_deref()))
    }
}
