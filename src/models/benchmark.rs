use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The direction in which a benchmark gets better.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Copy)]
pub enum BenchmarkImproves {
    Up,
    Down,
}

/// The tool that produced an entry's benches. Unknown ids are kept verbatim.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug, Hash)]
#[serde(from = "String", into = "String")]
pub enum Tool {
    CustomSmallerIsBetter,
    CustomBiggerIsBetter,
    Cargo,
    Go,
    BenchmarkJs,
    Pytest,
    GoogleCpp,
    Catch2,
    Julia,
    BenchmarkDotNet,
    Jmh,
    Other(String),
}

impl Tool {
    pub fn as_str(&self) -> &str {
        match self {
            Tool::CustomSmallerIsBetter => "customSmallerIsBetter",
            Tool::CustomBiggerIsBetter => "customBiggerIsBetter",
            Tool::Cargo => "cargo",
            Tool::Go => "go",
            Tool::BenchmarkJs => "benchmarkjs",
            Tool::Pytest => "pytest",
            Tool::GoogleCpp => "googlecpp",
            Tool::Catch2 => "catch2",
            Tool::Julia => "julia",
            Tool::BenchmarkDotNet => "benchmarkdotnet",
            Tool::Jmh => "jmh",
            Tool::Other(id) => id,
        }
    }

    pub fn improves(&self) -> BenchmarkImproves {
        match self {
            Tool::CustomBiggerIsBetter | Tool::BenchmarkJs | Tool::Pytest | Tool::Jmh => {
                BenchmarkImproves::Up
            }
            _ => BenchmarkImproves::Down,
        }
    }
}

impl From<String> for Tool {
    fn from(id: String) -> Self {
        match id.as_str() {
            "customSmallerIsBetter" => Tool::CustomSmallerIsBetter,
            "customBiggerIsBetter" => Tool::CustomBiggerIsBetter,
            "cargo" => Tool::Cargo,
            "go" => Tool::Go,
            "benchmarkjs" => Tool::BenchmarkJs,
            "pytest" => Tool::Pytest,
            "googlecpp" => Tool::GoogleCpp,
            "catch2" => Tool::Catch2,
            "julia" => Tool::Julia,
            "benchmarkdotnet" => Tool::BenchmarkDotNet,
            "jmh" => Tool::Jmh,
            _ => Tool::Other(id),
        }
    }
}

impl From<Tool> for String {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Other(id) => id,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Tool {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tool::from(s.to_string()))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
