//! # 工作流配置文件
//!
//! TOML 格式，描述元素池、原型结构与 SQS / 拟合参数。
//! 命令行参数优先于文件中的值。
//!
//! ```toml
//! [elements]
//! primary = ["Zr", "Hf", "Ta"]
//! system_size = 2
//! primary_range = [2, 2]
//!
//! [prototype]
//! name = "HEDB1"
//! a = 1.0
//! ...
//! coords = """
//! 0.0 0.0 0.0 a
//! 0.5 0.5 0.5 B
//! """
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`, `parsers/rndstr.rs`
//! - 使用 `serde` + `toml`

use crate::error::{BladeError, Result};
use crate::models::{CompositionRequest, CountRange, LatticeParameters, UnitCellTemplate};
use crate::parsers::rndstr;
use crate::sqs::supercell::{DEFAULT_MAX_DENOMINATOR, DEFAULT_MIN_MIXED_SITES, DEFAULT_MIXED_LABEL};

use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

/// 完整工作流配置
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    pub elements: Option<ElementsConfig>,
    pub prototype: Option<PrototypeConfig>,
    #[serde(default)]
    pub sqs: SqsConfig,
    #[serde(default)]
    pub fit: FitConfig,
}

impl WorkflowConfig {
    /// 读取并解析配置文件
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BladeError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| BladeError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_toml(&content, &path.display().to_string())
    }

    pub fn from_toml(content: &str, source_name: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BladeError::ConfigError {
            path: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn elements(&self) -> Result<&ElementsConfig> {
        self.elements.as_ref().ok_or_else(|| BladeError::ConfigError {
            path: "workflow".to_string(),
            reason: "missing [elements] table".to_string(),
        })
    }

    pub fn prototype(&self) -> Result<&PrototypeConfig> {
        self.prototype.as_ref().ok_or_else(|| BladeError::ConfigError {
            path: "workflow".to_string(),
            reason: "missing [prototype] table".to_string(),
        })
    }
}

/// `[elements]`：成分枚举参数
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ElementsConfig {
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    pub system_size: usize,
    #[serde(deserialize_with = "primary_range")]
    pub primary_range: CountRange,
    #[serde(default = "zero_range", deserialize_with = "secondary_range")]
    pub secondary_range: CountRange,
    #[serde(default = "default_true")]
    pub allow_lower_order: bool,
}

impl ElementsConfig {
    pub fn to_request(&self) -> Result<CompositionRequest> {
        CompositionRequest::new(
            self.primary.clone(),
            self.secondary.clone(),
            self.system_size,
            self.primary_range,
            self.secondary_range,
            self.allow_lower_order,
        )
    }
}

/// `[prototype]`：原型结构
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PrototypeConfig {
    pub name: String,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    #[serde(default = "default_mixed_label")]
    pub mixed_label: String,
    /// 每行 `x y z label`
    pub coords: String,
}

impl PrototypeConfig {
    pub fn template(&self) -> Result<UnitCellTemplate> {
        let sites = rndstr::parse_sites(&self.coords)?;
        if sites.is_empty() {
            return Err(BladeError::ConfigError {
                path: "workflow".to_string(),
                reason: format!("prototype '{}' has no sites", self.name),
            });
        }

        Ok(UnitCellTemplate::new(
            LatticeParameters::new(self.a, self.b, self.c, self.alpha, self.beta, self.gamma),
            sites,
        ))
    }
}

/// `[sqs]`：SQS 生成参数
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SqsConfig {
    #[serde(default = "default_sqsgen_levels")]
    pub levels: Vec<String>,
    #[serde(default = "default_level")]
    pub level: usize,
    /// mcsqs 运行秒数，到时写入 stopsqs
    #[serde(default = "default_time")]
    pub time: u64,
    #[serde(default = "default_min_mixed_sites")]
    pub min_mixed_sites: usize,
    #[serde(default = "default_max_denominator")]
    pub max_denominator: u64,
    #[serde(default = "default_sqs_output")]
    pub output_dir: PathBuf,
    #[serde(default = "default_pair_clusters")]
    pub pair_clusters: String,
    #[serde(default = "default_triplet_clusters")]
    pub triplet_clusters: String,
    /// ATAT 可执行文件所在目录；缺省时从 PATH 查找
    #[serde(default)]
    pub atat_bin: Option<PathBuf>,
}

impl Default for SqsConfig {
    fn default() -> Self {
        SqsConfig {
            levels: default_sqsgen_levels(),
            level: default_level(),
            time: default_time(),
            min_mixed_sites: default_min_mixed_sites(),
            max_denominator: default_max_denominator(),
            output_dir: default_sqs_output(),
            pair_clusters: default_pair_clusters(),
            triplet_clusters: default_triplet_clusters(),
            atat_bin: None,
        }
    }
}

/// `[fit]`：热力学数据库拟合准备
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FitConfig {
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub liquid: bool,
    #[serde(default = "default_fit_output")]
    pub output_dir: PathBuf,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            phases: Vec::new(),
            liquid: false,
            output_dir: default_fit_output(),
        }
    }
}

/// `[min, max]` 数组，按范围名校验
fn named_range<'de, D>(name: &str, deserializer: D) -> std::result::Result<CountRange, D::Error>
where
    D: Deserializer<'de>,
{
    let [min, max] = <[usize; 2]>::deserialize(deserializer)?;
    CountRange::named(name, min, max).map_err(serde::de::Error::custom)
}

fn primary_range<'de, D>(deserializer: D) -> std::result::Result<CountRange, D::Error>
where
    D: Deserializer<'de>,
{
    named_range("primary", deserializer)
}

fn secondary_range<'de, D>(deserializer: D) -> std::result::Result<CountRange, D::Error>
where
    D: Deserializer<'de>,
{
    named_range("secondary", deserializer)
}

fn zero_range() -> CountRange {
    CountRange::exactly(0)
}

fn default_true() -> bool {
    true
}

fn default_mixed_label() -> String {
    DEFAULT_MIXED_LABEL.to_string()
}

/// sqs2tdb 的标准层级（a 亚晶格）
pub fn default_sqsgen_levels() -> Vec<String> {
    [
        "level=0         a=1",
        "level=1         a=0.5,0.5",
        "level=2         a=0.75,0.25",
        "level=3         a=0.33333,0.33333,0.33333",
        "level=4         a=0.5,0.25,0.25",
        "level=5         a=0.875,0.125\nlevel=5         a=0.625,0.375",
        "level=6         a=0.75,0.125,0.125",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_level() -> usize {
    4
}

fn default_time() -> u64 {
    30
}

fn default_min_mixed_sites() -> usize {
    DEFAULT_MIN_MIXED_SITES
}

fn default_max_denominator() -> u64 {
    DEFAULT_MAX_DENOMINATOR
}

fn default_sqs_output() -> PathBuf {
    PathBuf::from("sqsdb")
}

fn default_pair_clusters() -> String {
    "1,2,3".to_string()
}

fn default_triplet_clusters() -> String {
    "1".to_string()
}

fn default_fit_output() -> PathBuf {
    PathBuf::from("tdb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
[elements]
primary = ["Hf", "Mo", "Cr"]
system_size = 2
primary_range = [2, 2]

[prototype]
name = "HEDB1"
a = 1
b = 1
c = 1.63299
alpha = 90
beta = 90
gamma = 120
coords = """
0.000000 0.000000 0.000000  a
0.333333 0.666667 0.000000  a
0.166667 0.833333 0.5       B
"""

[sqs]
level = 2
time = 5
atat_bin = "/opt/atat/bin"

[fit]
phases = ["HEDB1"]
liquid = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = WorkflowConfig::from_toml(FULL, "blade.toml").unwrap();

        let elements = config.elements().unwrap();
        assert_eq!(elements.secondary_range, CountRange::exactly(0));
        assert!(elements.allow_lower_order);
        assert_eq!(elements.to_request().unwrap().max_size, 2);

        let prototype = config.prototype().unwrap();
        assert_eq!(prototype.mixed_label, "a");
        let template = prototype.template().unwrap();
        assert_eq!(template.count_sites("a").mixed, 2);
        assert!((template.parameters.c - 1.63299).abs() < 1e-12);

        assert_eq!(config.sqs.level, 2);
        assert_eq!(config.sqs.time, 5);
        assert_eq!(config.sqs.levels.len(), 7);
        assert_eq!(config.sqs.max_denominator, 96);
        assert_eq!(config.sqs.pair_clusters, "1,2,3");
        assert_eq!(config.sqs.atat_bin, Some(PathBuf::from("/opt/atat/bin")));

        assert!(config.fit.liquid);
        assert_eq!(config.fit.output_dir, PathBuf::from("tdb"));
    }

    #[test]
    fn test_demo_config() {
        use crate::sqs::SupercellSizer;

        let config =
            WorkflowConfig::from_toml(include_str!("../demos/hedb1.toml"), "hedb1.toml").unwrap();
        let template = config.prototype().unwrap().template().unwrap();

        let sites = template.count_sites("a");
        assert_eq!((sites.mixed, sites.fixed), (14, 6));

        let result = SupercellSizer::new(&template)
            .supercell_size(&[0.75, 0.125, 0.125])
            .unwrap();
        assert_eq!(result.total_atoms, 80);
        assert_eq!(result.counts, vec![42, 7, 7]);
    }

    #[test]
    fn test_defaults_when_tables_missing() {
        let config = WorkflowConfig::from_toml("", "empty.toml").unwrap();
        assert!(config.elements().is_err());
        assert!(config.prototype().is_err());
        assert_eq!(config.sqs.min_mixed_sites, 16);
        assert!(config.sqs.atat_bin.is_none());
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_ranges() {
        let unknown = "[sqs]\nlevels = []\nbogus = 1\n";
        assert!(matches!(
            WorkflowConfig::from_toml(unknown, "x.toml"),
            Err(BladeError::ConfigError { .. })
        ));

        let inverted = "[elements]\nprimary = [\"Hf\"]\nsystem_size = 1\nprimary_range = [2, 1]\n";
        let err = WorkflowConfig::from_toml(inverted, "x.toml").unwrap_err();
        assert!(err.to_string().contains("Invalid primary range"));

        let inverted = "[elements]\nprimary = [\"Hf\"]\nsystem_size = 1\nprimary_range = [1, 1]\nsecondary_range = [1, 0]\n";
        let err = WorkflowConfig::from_toml(inverted, "x.toml").unwrap_err();
        assert!(err.to_string().contains("Invalid secondary range"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = WorkflowConfig::load(file.path()).unwrap();
        assert_eq!(config.prototype().unwrap().name, "HEDB1");

        let missing = WorkflowConfig::load(Path::new("/nonexistent/blade.toml"));
        assert!(matches!(missing, Err(BladeError::FileNotFound { .. })));
    }
}
