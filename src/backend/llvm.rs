use std::ffi::{CStr, CString};

use libc::c_char;
use llvm_sys::analysis::{LLVMVerifierFailureAction, LLVMVerifyFunction};
use llvm_sys::prelude::*;
use llvm_sys::{core, LLVMRealPredicate};

use super::{ArithOp, Backend, RealPredicate};
use crate::error::{Error, ErrorKind};

fn cstring(s: &str) -> Result<CString, Error> {
    CString::new(s).map_err(|e| ErrorKind::Codegen(e.to_string()).into())
}

/// Takes ownership of a message allocated by LLVM.
unsafe fn take_message(message: *mut c_char) -> String {
    let text = CStr::from_ptr(message).to_string_lossy().into_owned();
    core::LLVMDisposeMessage(message);
    text
}

unsafe fn value_name(value: LLVMValueRef) -> String {
    CStr::from_ptr(core::LLVMGetValueName(value))
        .to_string_lossy()
        .into_owned()
}

/// A real LLVM module with its own context and builder.
pub(crate) struct Module {
    context: LLVMContextRef,
    module: LLVMModuleRef,
    builder: LLVMBuilderRef,
    double_type: LLVMTypeRef,
}

impl Module {
    pub(crate) fn new(name: &str) -> Self {
        let name = CString::new(name).unwrap_or_default();
        unsafe {
            let context = core::LLVMContextCreate();
            let module = core::LLVMModuleCreateWithNameInContext(name.as_ptr(), context);
            let builder = core::LLVMCreateBuilderInContext(context);
            let double_type = core::LLVMDoubleTypeInContext(context);
            Module {
                context,
                module,
                builder,
                double_type,
            }
        }
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        unsafe {
            core::LLVMDisposeBuilder(self.builder);
            core::LLVMDisposeModule(self.module);
            core::LLVMContextDispose(self.context);
        }
    }
}

impl Backend for Module {
    type Function = LLVMValueRef;
    type Value = LLVMValueRef;

    fn get_function(&self, name: &str) -> Option<LLVMValueRef> {
        let name = cstring(name).ok()?;
        let f = unsafe { core::LLVMGetNamedFunction(self.module, name.as_ptr()) };
        if f.is_null() {
            None
        } else {
            Some(f)
        }
    }

    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<LLVMValueRef, Error> {
        let c_name = cstring(name)?;
        let mut param_types = vec![self.double_type; params.len()];
        unsafe {
            let fn_type = core::LLVMFunctionType(
                self.double_type,
                param_types.as_mut_ptr(),
                param_types.len() as u32,
                0,
            );
            let f = core::LLVMAddFunction(self.module, c_name.as_ptr(), fn_type);
            for (i, param) in params.iter().enumerate() {
                let c_param = cstring(param)?;
                core::LLVMSetValueName(core::LLVMGetParam(f, i as u32), c_param.as_ptr());
            }
            Ok(f)
        }
    }

    fn has_body(&self, function: LLVMValueRef) -> bool {
        unsafe { core::LLVMCountBasicBlocks(function) > 0 }
    }

    fn params(&self, function: LLVMValueRef) -> Vec<(String, LLVMValueRef)> {
        unsafe {
            (0..core::LLVMCountParams(function))
                .map(|i| {
                    let param = core::LLVMGetParam(function, i);
                    (value_name(param), param)
                })
                .collect()
        }
    }

    fn begin_function_body(&mut self, function: LLVMValueRef) -> Result<(), Error> {
        unsafe {
            let bb = core::LLVMAppendBasicBlockInContext(
                self.context,
                function,
                b"entry\0".as_ptr() as *const _,
            );
            core::LLVMPositionBuilderAtEnd(self.builder, bb);
        }
        Ok(())
    }

    fn const_real(&mut self, n: f64) -> LLVMValueRef {
        unsafe { core::LLVMConstReal(self.double_type, n) }
    }

    fn build_arith(
        &mut self,
        op: ArithOp,
        lhs: LLVMValueRef,
        rhs: LLVMValueRef,
        name: &str,
    ) -> Result<LLVMValueRef, Error> {
        let name = cstring(name)?;
        let build = match op {
            ArithOp::FAdd => core::LLVMBuildFAdd,
            ArithOp::FSub => core::LLVMBuildFSub,
            ArithOp::FMul => core::LLVMBuildFMul,
            ArithOp::FDiv => core::LLVMBuildFDiv,
        };
        Ok(unsafe { build(self.builder, lhs, rhs, name.as_ptr()) })
    }

    fn build_fcmp(
        &mut self,
        pred: RealPredicate,
        lhs: LLVMValueRef,
        rhs: LLVMValueRef,
        name: &str,
    ) -> Result<LLVMValueRef, Error> {
        let name = cstring(name)?;
        let pred = match pred {
            RealPredicate::ULT => LLVMRealPredicate::LLVMRealULT,
            RealPredicate::UGT => LLVMRealPredicate::LLVMRealUGT,
            RealPredicate::UEQ => LLVMRealPredicate::LLVMRealUEQ,
        };
        Ok(unsafe { core::LLVMBuildFCmp(self.builder, pred, lhs, rhs, name.as_ptr()) })
    }

    fn build_ui_to_fp(&mut self, value: LLVMValueRef, name: &str) -> Result<LLVMValueRef, Error> {
        let name = cstring(name)?;
        Ok(unsafe { core::LLVMBuildUIToFP(self.builder, value, self.double_type, name.as_ptr()) })
    }

    fn build_ret(&mut self, value: LLVMValueRef) -> Result<(), Error> {
        unsafe { core::LLVMBuildRet(self.builder, value) };
        Ok(())
    }

    fn verify_function(&self, function: LLVMValueRef) -> Result<(), Error> {
        let broken = unsafe {
            LLVMVerifyFunction(function, LLVMVerifierFailureAction::LLVMReturnStatusAction)
        };
        if broken != 0 {
            let name = unsafe { value_name(function) };
            return Err(ErrorKind::Verify(format!("function '{}' is malformed", name)).into());
        }
        Ok(())
    }

    fn remove_function(&mut self, function: LLVMValueRef) {
        unsafe {
            core::LLVMClearInsertionPosition(self.builder);
            core::LLVMDeleteFunction(function);
        }
    }

    fn print_function(&self, function: LLVMValueRef) -> String {
        unsafe { take_message(core::LLVMPrintValueToString(function)) }
    }

    fn print_module(&self) -> String {
        unsafe { take_message(core::LLVMPrintModuleToString(self.module)) }
    }
}
