//! Canonical option resolution.

use crate::abi::CoreFuncType;
use crate::ast::CanonOpt;
use crate::error::{InvalidCanonOption, Result};
use crate::logging::{error, warn};
use crate::runtime::{ComponentInstance, CoreFuncIdx, MemoryIdx};

/// The `memory` and `realloc` selections of one canonical declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonOptions {
    pub memory: Option<MemoryIdx>,
    pub realloc: Option<CoreFuncIdx>,
}

impl CanonOptions {
    /// Read the declared options and check them against `instance`.
    pub fn resolve(options: &[CanonOpt], instance: &ComponentInstance) -> Result<Self> {
        let resolved = Self::parse(options)?;
        resolved.validate(instance)?;
        Ok(resolved)
    }

    /// Read the declared options without looking at the instance.
    ///
    /// Any explicit string encoding and any post-return hook is rejected.
    pub fn parse(options: &[CanonOpt]) -> Result<Self> {
        let mut resolved = Self::default();
        for option in options {
            match *option {
                CanonOpt::Memory(idx) => {
                    if resolved.memory.replace(MemoryIdx(idx)).is_some() {
                        warn!("option `memory` is declared more than once");
                        return Err(InvalidCanonOption::Duplicate("memory").into());
                    }
                }
                CanonOpt::Realloc(idx) => {
                    if resolved.realloc.replace(CoreFuncIdx(idx)).is_some() {
                        warn!("option `realloc` is declared more than once");
                        return Err(InvalidCanonOption::Duplicate("realloc").into());
                    }
                }
                CanonOpt::StringEncoding(encoding) => {
                    warn!(%encoding, "string-encoding is not supported");
                    return Err(InvalidCanonOption::StringEncoding(encoding).into());
                }
                CanonOpt::PostReturn(func) => {
                    error!(func, "post-return is not supported");
                    return Err(InvalidCanonOption::PostReturn(func).into());
                }
            }
        }
        Ok(resolved)
    }

    /// Check that the selected memory and realloc exist in `instance`, and
    /// that realloc has the reallocator signature.
    pub fn validate(&self, instance: &ComponentInstance) -> Result<()> {
        if let Some(memory) = self.memory {
            instance.memory(memory)?;
        }
        if let Some(realloc) = self.realloc {
            let ty = instance.core_function(realloc)?.func_type();
            if *ty != CoreFuncType::realloc() {
                error!(%realloc, signature = %ty, "realloc has the wrong signature");
                return Err(InvalidCanonOption::ReallocSignature(ty.to_string()).into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CoreType, LinearMemory};
    use crate::ast::StringEncoding;
    use crate::error::CanonError;
    use crate::runtime::{BumpRealloc, CoreFn};

    fn instance() -> ComponentInstance {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::with_size(16));
        inst.add_core_host_function(BumpRealloc::new(mem, 0));
        inst
    }

    #[test]
    fn memory_and_realloc_resolve() {
        let inst = instance();
        let opts = CanonOptions::resolve(&[CanonOpt::Memory(0), CanonOpt::Realloc(0)], &inst)
            .unwrap();
        assert_eq!(opts.memory, Some(MemoryIdx(0)));
        assert_eq!(opts.realloc, Some(CoreFuncIdx(0)));
        assert_eq!(CanonOptions::resolve(&[], &inst).unwrap(), CanonOptions::default());
    }

    #[test]
    fn every_string_encoding_is_rejected() {
        for encoding in [
            StringEncoding::Utf8,
            StringEncoding::Utf16,
            StringEncoding::CompactUtf16,
        ] {
            let err = CanonOptions::parse(&[CanonOpt::StringEncoding(encoding)]).unwrap_err();
            assert!(matches!(
                err,
                CanonError::InvalidCanonOption(InvalidCanonOption::StringEncoding(e)) if e == encoding
            ));
        }
    }

    #[test]
    fn post_return_is_rejected() {
        let err = CanonOptions::parse(&[CanonOpt::Memory(0), CanonOpt::PostReturn(3)]).unwrap_err();
        assert!(matches!(
            err,
            CanonError::InvalidCanonOption(InvalidCanonOption::PostReturn(3))
        ));
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = CanonOptions::parse(&[CanonOpt::Memory(0), CanonOpt::Memory(1)]).unwrap_err();
        assert!(matches!(
            err,
            CanonError::InvalidCanonOption(InvalidCanonOption::Duplicate("memory"))
        ));
    }

    #[test]
    fn indices_must_resolve() {
        let inst = instance();
        assert!(matches!(
            CanonOptions::resolve(&[CanonOpt::Memory(4)], &inst),
            Err(CanonError::UnknownIndex { .. })
        ));
        assert!(matches!(
            CanonOptions::resolve(&[CanonOpt::Realloc(9)], &inst),
            Err(CanonError::UnknownIndex { .. })
        ));
    }

    #[test]
    fn realloc_signature_is_checked() {
        let mut inst = instance();
        let ty = CoreFuncType::new(vec![CoreType::I32], vec![CoreType::I32]);
        let f = inst.add_core_host_function(CoreFn::new(ty, |_, args| Ok(args.to_vec())));
        let err = CanonOptions::resolve(&[CanonOpt::Realloc(f.0)], &inst).unwrap_err();
        assert!(matches!(
            err,
            CanonError::InvalidCanonOption(InvalidCanonOption::ReallocSignature(_))
        ));
    }
}
