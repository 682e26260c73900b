//! # 原胞模板数据模型
//!
//! 定义 SQS 原型结构：晶格参数 + 带亚晶格标签的分数坐标格点。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `sqs/`, `workflow/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数 (a, b, c, alpha, beta, gamma)，角度单位：度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl LatticeParameters {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        LatticeParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alpha, self.beta, self.gamma]
    }
}

/// 晶格向量表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数创建晶格（a 沿 x，b 在 xy 平面内）
    pub fn from_parameters(params: &LatticeParameters) -> Self {
        let alpha_rad = params.alpha.to_radians();
        let beta_rad = params.beta.to_radians();
        let gamma_rad = params.gamma.to_radians();

        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let (a, b, c) = (params.a, params.b, params.c);

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        // 数值误差可能使平方和略大于 c^2
        let c3 = (c * c - c1 * c1 - c2 * c2).max(0.0).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数
    pub fn parameters(&self) -> LatticeParameters {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        LatticeParameters {
            a,
            b,
            c,
            alpha: angle_deg(b_vec, c_vec, b * c),
            beta: angle_deg(a_vec, c_vec, a * c),
            gamma: angle_deg(a_vec, b_vec, a * b),
        }
    }

    /// 计算晶格体积（带符号的行列式）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0].powi(2) + v[1].powi(2) + v[2].powi(2)).sqrt()
}

fn angle_deg(u: [f64; 3], v: [f64; 3], norms: f64) -> f64 {
    let dot: f64 = u.iter().zip(v.iter()).map(|(x, y)| x * y).sum();
    (dot / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

/// 单个格点：分数坐标 + 亚晶格标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub position: [f64; 3],
    pub label: String,
}

impl SiteRecord {
    pub fn new(position: [f64; 3], label: impl Into<String>) -> Self {
        SiteRecord {
            position,
            label: label.into(),
        }
    }
}

/// 按亚晶格统计的格点数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SublatticeCounts {
    /// 混合（SQS 替换）亚晶格格点数
    pub mixed: usize,
    /// 其余标签的格点数
    pub fixed: usize,
}

impl SublatticeCounts {
    pub fn total(&self) -> usize {
        self.mixed + self.fixed
    }
}

/// 原胞模板
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCellTemplate {
    pub parameters: LatticeParameters,
    pub sites: Vec<SiteRecord>,
}

impl UnitCellTemplate {
    pub fn new(parameters: LatticeParameters, sites: Vec<SiteRecord>) -> Self {
        UnitCellTemplate { parameters, sites }
    }

    pub fn lattice(&self) -> Lattice {
        Lattice::from_parameters(&self.parameters)
    }

    /// 统计 `mixed_label` 亚晶格与其余亚晶格的格点数
    pub fn count_sites(&self, mixed_label: &str) -> SublatticeCounts {
        let mixed = self
            .sites
            .iter()
            .filter(|site| site.label == mixed_label)
            .count();

        SublatticeCounts {
            mixed,
            fixed: self.sites.len() - mixed,
        }
    }
}
