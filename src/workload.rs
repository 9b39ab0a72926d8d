//! The synthetic program the compiler benchmark is timed against.
//!
//! Every function declares a long chain of `i32-add` bindings, each one
//! referring back to a random earlier binding, then folds all of them into a
//! deeply nested `result` and calls the previously generated function.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const INDENT: &str = "   ";
const INDENT2: &str = "     ";
const INDENT3: &str = "       ";
const BINDING: &str = "bndng";
const FUNCTION: &str = "test-fn-";

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WorkloadConfig {
    pub functions: usize,
    pub statements: usize,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            functions: 400,
            statements: 400,
            seed: 0,
        }
    }
}

pub fn generate(config: &WorkloadConfig) -> Result<String> {
    if config.functions == 0 {
        return Err(Error::InvalidWorkload("at least one function is required".into()));
    }
    if config.statements < 2 {
        return Err(Error::InvalidWorkload("at least two statements are required".into()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut out = String::new();
    let chain = 1..config.statements - 1;

    for i in 0..config.functions {
        out.push_str(&format!(
            "(sig {FUNCTION}{i} (Fn I32 I32 I32))\n\
             (fun {FUNCTION}{i} (a b)\n\
             {INDENT}(sig {BINDING}0 I32)\n\
             {INDENT}(let {BINDING}0 0)\n"
        ));
        for j in chain.clone() {
            let backref = rng.gen_range(0..j);
            out.push_str(&format!(
                "\n{INDENT}(sig {BINDING}{j} I32)\n\
                 {INDENT}(let {BINDING}{j} (i32-add {BINDING}{backref} {j}))\n"
            ));
        }

        out.push_str(INDENT);
        out.push_str("(let result\n");
        for j in chain.clone() {
            out.push_str(&format!("{INDENT2}(i32-add {BINDING}{j}\n"));
        }
        out.push_str(INDENT3);
        out.push('1');
        out.extend(chain.clone().map(|_| ')'));
        out.push_str(")\n");

        if i == 0 {
            out.push_str(&format!("{INDENT}result"));
        } else {
            out.push_str(&format!("{INDENT}({FUNCTION}{} 2 result)", i - 1));
        }
        out.push_str(")\n\n");
    }
    out.push_str(&format!(
        "(fun entry () ({FUNCTION}{} 42 101))",
        config.functions - 1
    ));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> WorkloadConfig {
        WorkloadConfig {
            functions: 2,
            statements: 4,
            seed,
        }
    }

    #[test]
    fn deterministic_per_seed() {
        assert_eq!(generate(&small(7)).unwrap(), generate(&small(7)).unwrap());
    }

    #[test]
    fn shape_of_a_small_program() {
        let program = generate(&small(1)).unwrap();

        assert!(program.starts_with(
            "(sig test-fn-0 (Fn I32 I32 I32))\n(fun test-fn-0 (a b)\n   (sig bndng0 I32)\n   (let bndng0 0)\n"
        ));
        assert!(program.contains("   (let bndng1 (i32-add bndng0 1))\n"));
        assert!(program.contains(
            "   (let result\n     (i32-add bndng1\n     (i32-add bndng2\n       1)))\n   result)\n\n"
        ));
        assert!(program.contains("   (test-fn-0 2 result))\n\n"));
        assert!(program.ends_with("(fun entry () (test-fn-1 42 101))"));

        let opened = program.matches('(').count();
        let closed = program.matches(')').count();
        assert_eq!(opened, closed);
    }

    #[test]
    fn backrefs_point_to_earlier_bindings() {
        let program = generate(&WorkloadConfig {
            functions: 1,
            statements: 50,
            seed: 3,
        })
        .unwrap();
        for line in program.lines().filter(|l| l.contains("(let bndng")) {
            let binding: usize = line
                .split_whitespace()
                .nth(1)
                .and_then(|b| b.strip_prefix("bndng"))
                .unwrap()
                .parse()
                .unwrap();
            if let Some(rest) = line.split("(i32-add bndng").nth(1) {
                let backref: usize = rest.split_whitespace().next().unwrap().parse().unwrap();
                assert!(backref < binding, "{line}");
            }
        }
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let mut config = WorkloadConfig::default();
        config.functions = 0;
        assert!(matches!(generate(&config), Err(Error::InvalidWorkload(_))));
        config.functions = 1;
        config.statements = 1;
        assert!(matches!(generate(&config), Err(Error::InvalidWorkload(_))));
    }
}
