//! Build script: generates the dispatch targets and compiles the C trials.
//!
//! Both the Rust and the C targets (512 per function set, plus one `match`
//! or `switch` per fan-out) are emitted into `OUT_DIR`.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Fan-outs measured by the benchmark. Must match `code::FAN_OUTS`.
const FAN_OUTS: [usize; 8] = [4, 8, 16, 32, 64, 128, 256, 512];
const MAX_FAN_OUT: usize = 512;

/// (label used in generated identifiers, table name, Rust inline attribute, C qualifier)
const FUNCTION_SETS: [(&str, &str, &str, &str); 2] = [
    ("minimal", "MINIMAL_FUNCS", "#[inline]", "SVT_INLINE"),
    ("no_inline", "NO_INLINE_FUNCS", "#[inline(never)]", "SVT_NOINLINE"),
];

fn main() {
    println!("cargo:rustc-check-cfg=cfg(c_implementation_active)");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    write_file(&out_dir.join("switch_vs_table_targets.rs"), &rust_targets());

    build_c_implementation(&out_dir);
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents)
        .unwrap_or_else(|e| panic!("failed to write {}: {}", path.display(), e));
}

// ============================================================================
// Rust targets
// ============================================================================

fn rust_targets() -> String {
    let mut out = String::new();
    out.push_str("// @generated by build.rs, do not edit.\n\n");

    for (set, table, inline, _) in FUNCTION_SETS {
        for j in 0..MAX_FAN_OUT {
            writeln!(
                out,
                "{inline}\npub fn {set}_{j}(x: i64) -> i64 {{\n    x.wrapping_add({j})\n}}\n"
            )
            .unwrap();
        }

        writeln!(out, "pub static {table}: [DispatchFn; {MAX_FAN_OUT}] = [").unwrap();
        for j in 0..MAX_FAN_OUT {
            writeln!(out, "    {set}_{j},").unwrap();
        }
        out.push_str("];\n\n");

        for n in FAN_OUTS {
            writeln!(out, "#[inline(always)]\npub fn switch_{set}_{n}(k: usize, x: i64) -> i64 {{").unwrap();
            out.push_str("    match k {\n");
            for j in 0..n {
                writeln!(out, "        {j} => {set}_{j}(x),").unwrap();
            }
            out.push_str("        _ => 0,\n    }\n}\n\n");

            writeln!(
                out,
                "#[inline(never)]\npub fn switch_{set}_{n}_trial(selector: Selector<'_>, budget: usize) -> i64 {{\n    run_pattern(selector, {n}, budget, switch_{set}_{n})\n}}\n"
            )
            .unwrap();
        }
    }

    out.push_str("pub fn switch_trial(set: FunctionSet, fan_out: usize) -> Option<TrialFn> {\n");
    out.push_str("    let trial: TrialFn = match (set, fan_out) {\n");
    for (set, _, _, _) in FUNCTION_SETS {
        for n in FAN_OUTS {
            writeln!(
                out,
                "        (FunctionSet::{}, {n}) => switch_{set}_{n}_trial,",
                variant_name(set)
            )
            .unwrap();
        }
    }
    out.push_str("        _ => return None,\n    };\n    Some(trial)\n}\n");

    out
}

fn variant_name(set: &str) -> &'static str {
    match set {
        "minimal" => "Minimal",
        "no_inline" => "NoInline",
        other => panic!("unknown function set {other}"),
    }
}

// ============================================================================
// C targets
// ============================================================================

fn c_header() -> String {
    let mut out = String::new();
    out.push_str("/* @generated by build.rs, do not edit. */\n");
    out.push_str("#ifndef SWITCH_VS_TABLE_TARGETS_H\n#define SWITCH_VS_TABLE_TARGETS_H\n\n");
    out.push_str("#include <stddef.h>\n#include <stdint.h>\n\n");
    out.push_str("#if defined(_MSC_VER)\n");
    out.push_str("#define SVT_INLINE static __inline\n");
    out.push_str("#define SVT_NOINLINE static __declspec(noinline)\n");
    out.push_str("#else\n");
    out.push_str("#define SVT_INLINE static inline\n");
    out.push_str("#define SVT_NOINLINE static __attribute__((noinline))\n");
    out.push_str("#endif\n\n");
    out.push_str("typedef int64_t (*svt_dispatch_fn)(int64_t);\n\n");
    out.push_str(
        "SVT_INLINE int64_t svt_wrapping_add(int64_t a, int64_t b)\n{\n    return (int64_t)((uint64_t)a + (uint64_t)b);\n}\n\n",
    );

    for (set, table, _, qualifier) in FUNCTION_SETS {
        for j in 0..MAX_FAN_OUT {
            writeln!(
                out,
                "{qualifier} int64_t {set}_{j}(int64_t x) {{ return svt_wrapping_add(x, {j}); }}"
            )
            .unwrap();
        }
        writeln!(out, "\nstatic const svt_dispatch_fn {table}[{MAX_FAN_OUT}] = {{").unwrap();
        for j in 0..MAX_FAN_OUT {
            writeln!(out, "    {set}_{j},").unwrap();
        }
        out.push_str("};\n\n");

        for n in FAN_OUTS {
            writeln!(out, "SVT_INLINE int64_t switch_{set}_{n}(size_t k, int64_t x)\n{{").unwrap();
            out.push_str("    switch (k) {\n");
            for j in 0..n {
                writeln!(out, "    case {j}: return {set}_{j}(x);").unwrap();
            }
            out.push_str("    default: return 0;\n    }\n}\n\n");
        }
    }

    out.push_str("#define SVT_FAN_OUTS(X)");
    for n in FAN_OUTS {
        write!(out, " X({n})").unwrap();
    }
    out.push_str("\n\n#endif\n");
    out
}

fn c_bindings() -> String {
    let mut out = String::new();
    out.push_str("// @generated by build.rs, do not edit.\n\n");
    out.push_str("extern \"C\" {\n");
    for (set, _, _, _) in FUNCTION_SETS {
        for n in FAN_OUTS {
            for mechanism in ["switch", "table"] {
                writeln!(
                    out,
                    "    fn svt_c_{mechanism}_{set}_{n}(inputs: *const u64, len: usize, budget: usize) -> i64;"
                )
                .unwrap();
            }
        }
    }
    out.push_str("}\n\n");

    out.push_str(
        "pub(super) fn c_trial(mechanism: Mechanism, set: FunctionSet, fan_out: usize) -> Option<CTrialFn> {\n",
    );
    out.push_str("    let trial: CTrialFn = match (mechanism, set, fan_out) {\n");
    for (set, _, _, _) in FUNCTION_SETS {
        for n in FAN_OUTS {
            for (mechanism, variant) in [("switch", "Switch"), ("table", "Table")] {
                writeln!(
                    out,
                    "        (Mechanism::{variant}, FunctionSet::{}, {n}) => svt_c_{mechanism}_{set}_{n},",
                    variant_name(set)
                )
                .unwrap();
            }
        }
    }
    out.push_str("        _ => return None,\n    };\n    Some(trial)\n}\n");
    out
}

fn build_c_implementation(out_dir: &Path) {
    // Check for C compiler compatibility and type
    let build = cc::Build::new();
    let compiler = match build.try_get_compiler() {
        Ok(compiler) => compiler,
        Err(e) => {
            println!("cargo:warning=No C compiler found ({e}). C implementation disabled.");
            return;
        }
    };

    let compiler_name = if compiler.is_like_clang() {
        // Only Apple Clang is accepted among Clang flavours.
        let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        if target_os != "macos" {
            println!("cargo:warning=Vanilla Clang detected. C implementation disabled (requires GCC, MSVC, or Apple Clang).");
            return;
        }
        "Apple Clang"
    } else if compiler.is_like_gnu() {
        "GCC"
    } else if compiler.is_like_msvc() {
        "MSVC"
    } else {
        println!("cargo:warning=C compiler is not compatible (needs GCC, Apple Clang, or MSVC). C implementation disabled.");
        return;
    };

    write_file(&out_dir.join("switch_vs_table_targets.h"), &c_header());
    write_file(&out_dir.join("switch_vs_table_c_trials.rs"), &c_bindings());

    let rustflags = env::var("RUSTFLAGS").unwrap_or_default();
    let encoded_rustflags = env::var("CARGO_ENCODED_RUSTFLAGS").unwrap_or_default();
    let is_rust_native =
        rustflags.contains("target-cpu=native") || encoded_rustflags.contains("target-cpu=native");

    let mut build = cc::Build::new();
    build.include(out_dir);

    // Auto-detect all C files in src/ directory
    let c_files = glob::glob("src/**/*.c")
        .expect("Failed to read glob pattern")
        .filter_map(|entry| entry.ok());

    for file in c_files {
        println!("cargo:rerun-if-changed={}", file.display());
        build.file(file);
    }

    build.opt_level(3);

    if is_rust_native {
        build.flag_if_supported("-march=native");
        println!("cargo:warning=Detected Rust target-cpu=native. Enabling -march=native for C compilation.");
    }

    build.compile("switch_vs_table_c");

    println!("cargo:rustc-cfg=c_implementation_active");
    println!("cargo:rustc-env=C_COMPILER_NAME={compiler_name}");
}
