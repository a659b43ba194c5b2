//! JNI export of the check for a managed host runtime.
//!
//! The host declares `private static native boolean isXposed()` on
//! `io.github.hellosmile.xposed.detect.XposedDetect` and loads this cdylib.

use jni::objects::JClass;
use jni::sys::{jboolean, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::panic;

/// Run the default check, converting the outcome to a JNI boolean.
///
/// A panic must not unwind into the JVM, so it is reported as not detected.
pub fn detect_for_host() -> jboolean {
    let present = panic::catch_unwind(crate::is_hooking_framework_present).unwrap_or(false);
    to_jboolean(present)
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_io_github_hellosmile_xposed_detect_XposedDetect_isXposed<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jboolean {
    detect_for_host()
}
