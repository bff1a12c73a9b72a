//! Uploads uniform values from a description to a linked program.

use super::context::check_gl_error;
use crate::error::HarnessError;
use crate::params::{ApiVersion, RunParams};
use crate::uniforms::{plan_bindings, UniformDescription, UniformInit, Width};

/// Reflected names of every active uniform in `program`, in index order.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if an index cannot be queried.
#[allow(unsafe_code)]
pub fn active_uniform_names(
    gl: &glow::Context,
    program: glow::Program,
) -> Result<Vec<String>, HarnessError> {
    use glow::HasContext;

    // SAFETY: program is a successfully linked program handle and every
    // index is below the reported active uniform count.
    let count = unsafe { gl.get_active_uniforms(program) };
    (0..count)
        .map(|index| {
            unsafe { gl.get_active_uniform(program, index) }
                .map(|uniform| uniform.name)
                .ok_or_else(|| {
                    HarnessError::Backend(format!("cannot query active uniform {index}"))
                })
        })
        .collect()
}

/// Sets every active uniform of the bound `program` from the run's
/// description. Returns how many uniforms were set.
///
/// The description is only loaded when the program has at least one
/// active uniform.
///
/// # Errors
///
/// - Description errors from [`UniformDescription::resolve`].
/// - `MissingUniform`, `DuplicateUniform`, `UnsupportedFunction` from
///   [`plan_bindings`].
/// - `HarnessError::Backend` if a uniform has no location or an upload
///   raises the GL error flag.
#[allow(unsafe_code)]
pub fn bind_uniforms(
    gl: &glow::Context,
    program: glow::Program,
    api: ApiVersion,
    params: &RunParams,
) -> Result<usize, HarnessError> {
    use glow::HasContext;

    let names = active_uniform_names(gl, program)?;
    let plan = plan_bindings(&names, api, || UniformDescription::resolve(params))?;

    for binding in &plan {
        // SAFETY: program is linked and currently in use.
        let location = unsafe { gl.get_uniform_location(program, &binding.name) }
            .ok_or_else(|| {
                HarnessError::Backend(format!("cannot find uniform named: {}", binding.name))
            })?;
        apply_uniform(gl, &location, &binding.init);
        let function = binding.init.function_name();
        check_gl_error(gl, &format!("{function} for uniform {}", binding.name))?;
        tracing::debug!(uniform = %binding.name, %function, "uniform set");
    }

    Ok(plan.len())
}

/// Calls the `glUniform*` setter `init` was declared with.
#[allow(unsafe_code)]
pub fn apply_uniform(gl: &glow::Context, location: &glow::UniformLocation, init: &UniformInit) {
    use glow::HasContext;

    let loc = Some(location);
    // SAFETY: location belongs to the program in use; slice lengths are
    // multiples of the component count, checked when the description
    // was loaded.
    unsafe {
        match init {
            UniformInit::Float1(x) => gl.uniform_1_f32(loc, *x),
            UniformInit::Float2([x, y]) => gl.uniform_2_f32(loc, *x, *y),
            UniformInit::Float3([x, y, z]) => gl.uniform_3_f32(loc, *x, *y, *z),
            UniformInit::Float4([x, y, z, w]) => gl.uniform_4_f32(loc, *x, *y, *z, *w),
            UniformInit::Int1(x) => gl.uniform_1_i32(loc, *x),
            UniformInit::Int2([x, y]) => gl.uniform_2_i32(loc, *x, *y),
            UniformInit::Int3([x, y, z]) => gl.uniform_3_i32(loc, *x, *y, *z),
            UniformInit::Int4([x, y, z, w]) => gl.uniform_4_i32(loc, *x, *y, *z, *w),
            UniformInit::Uint1(x) => gl.uniform_1_u32(loc, *x),
            UniformInit::Uint2([x, y]) => gl.uniform_2_u32(loc, *x, *y),
            UniformInit::Uint3([x, y, z]) => gl.uniform_3_u32(loc, *x, *y, *z),
            UniformInit::Uint4([x, y, z, w]) => gl.uniform_4_u32(loc, *x, *y, *z, *w),
            UniformInit::FloatArray { width, values } => match width {
                Width::One => gl.uniform_1_f32_slice(loc, values),
                Width::Two => gl.uniform_2_f32_slice(loc, values),
                Width::Three => gl.uniform_3_f32_slice(loc, values),
                Width::Four => gl.uniform_4_f32_slice(loc, values),
            },
            UniformInit::IntArray { width, values } => match width {
                Width::One => gl.uniform_1_i32_slice(loc, values),
                Width::Two => gl.uniform_2_i32_slice(loc, values),
                Width::Three => gl.uniform_3_i32_slice(loc, values),
                Width::Four => gl.uniform_4_i32_slice(loc, values),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binder_api_compiles() {
        fn _assert_api(gl: &glow::Context, program: glow::Program, api: ApiVersion, p: &RunParams) {
            let _: Result<usize, HarnessError> = bind_uniforms(gl, program, api, p);
            let _: Result<Vec<String>, HarnessError> = active_uniform_names(gl, program);
        }
    }

    #[test]
    #[ignore = "requires GL context"]
    fn program_without_uniforms_ignores_broken_description() {
        // Would test: a program with no active uniforms binds successfully
        // even when the sibling JSON file is malformed.
    }

    #[test]
    #[ignore = "requires GL context"]
    fn array_uniform_receives_every_element() {
        // Would test: glUniform1fv with three values fills weights[0..3].
    }
}
