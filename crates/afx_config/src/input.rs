// crates/afx_config/src/input.rs

//! 已解析输入记录
//!
//! 求解器核心只消费本模块的 [`SolverInput`]；所有字段带
//! `#[serde(default)]` 缺省值，JSON 配置可以只给出与缺省不同的项。

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use afx_foundation::{AfxError, AfxResult};
use serde::{Deserialize, Serialize};

// ============================================================
// 选项枚举
// ============================================================

/// 时间积分方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimeIntegration {
    /// 显式 Euler
    #[default]
    ExplicitEuler,
    /// 低存储四段 Runge-Kutta
    Rk4,
    /// 隐式 Euler（θ=1, ζ=0）
    ImplicitEuler,
    /// 二阶后向差分（θ=1, ζ=1/2）
    Bdf2,
}

impl TimeIntegration {
    /// 是否隐式推进
    #[inline]
    pub fn is_implicit(self) -> bool {
        matches!(self, Self::ImplicitEuler | Self::Bdf2)
    }

    /// Beam-Warming 双参数时间算子的 θ
    #[inline]
    pub fn theta(self) -> f64 {
        match self {
            Self::ImplicitEuler | Self::Bdf2 => 1.0,
            _ => 1.0,
        }
    }

    /// Beam-Warming 双参数时间算子的 ζ
    #[inline]
    pub fn zeta(self) -> f64 {
        match self {
            Self::Bdf2 => 0.5,
            _ => 0.0,
        }
    }
}

impl fmt::Display for TimeIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExplicitEuler => "explicitEuler",
            Self::Rk4 => "rk4",
            Self::ImplicitEuler => "implicitEuler",
            Self::Bdf2 => "bdf2",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TimeIntegration {
    type Err = AfxError;

    fn from_str(s: &str) -> AfxResult<Self> {
        match s {
            "explicitEuler" => Ok(Self::ExplicitEuler),
            "rk4" => Ok(Self::Rk4),
            "implicitEuler" => Ok(Self::ImplicitEuler),
            "bdf2" => Ok(Self::Bdf2),
            other => Err(AfxError::config(format!(
                "时间积分 '{}' 未识别, 可选: explicitEuler, rk4, implicitEuler, bdf2",
                other
            ))),
        }
    }
}

/// 空间精度阶数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Order {
    /// 一阶：面值取相邻单元值
    First,
    /// 二阶：κ-MUSCL 重构
    #[default]
    Second,
}

/// 斜率限制器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LimiterKind {
    /// 不限制
    None,
    /// Minmod，最耗散
    #[default]
    Minmod,
    /// Van Albada，光滑区接近不限制
    VanAlbada,
}

/// 隐式矩阵求解器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MatrixSolver {
    /// 对称 Gauss-Seidel 超平面扫掠
    #[default]
    Lusgs,
    /// LU-SGS 的块变体（与 lusgs 共用扫掠路径）
    Blusgs,
    /// 对角化点松弛
    Dplur,
    /// DPLUR 的块变体（与 dplur 共用路径）
    Bdplur,
}

impl MatrixSolver {
    /// 是否走 SGS 扫掠路径
    #[inline]
    pub fn is_sgs(self) -> bool {
        matches!(self, Self::Lusgs | Self::Blusgs)
    }
}

impl FromStr for MatrixSolver {
    type Err = AfxError;

    fn from_str(s: &str) -> AfxResult<Self> {
        match s {
            "lusgs" => Ok(Self::Lusgs),
            "blusgs" => Ok(Self::Blusgs),
            "dplur" => Ok(Self::Dplur),
            "bdplur" => Ok(Self::Bdplur),
            other => Err(AfxError::config(format!(
                "矩阵求解器 '{}' 未识别, 可选: lusgs, blusgs, dplur, bdplur",
                other
            ))),
        }
    }
}

/// 方程组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EquationSet {
    /// 无黏
    #[default]
    Euler,
    /// 层流 Navier-Stokes
    Laminar,
    /// 湍流 RANS（湍流模型经能力集注入）
    Turbulent,
}

impl EquationSet {
    /// 是否包含黏性通量
    #[inline]
    pub fn is_viscous(self) -> bool {
        matches!(self, Self::Laminar | Self::Turbulent)
    }

    /// 是否求解湍流标量方程
    #[inline]
    pub fn is_turbulent(self) -> bool {
        matches!(self, Self::Turbulent)
    }
}

// ============================================================
// 输入记录
// ============================================================

/// 求解器消费的已解析输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverInput {
    /// 时间积分方法
    #[serde(default)]
    pub time_integration: TimeIntegration,

    /// 空间精度阶数
    #[serde(default)]
    pub order: Order,

    /// 斜率限制器
    #[serde(default)]
    pub limiter: LimiterKind,

    /// MUSCL κ 参数，[-1, 1]
    #[serde(default = "default_kappa")]
    pub kappa: f64,

    /// 矩阵求解器
    #[serde(default)]
    pub matrix_solver: MatrixSolver,

    /// 隐式扫掠次数
    #[serde(default = "default_matrix_sweeps")]
    pub matrix_sweeps: usize,

    /// 隐式松弛因子 σ ∈ (0, 1]
    #[serde(default = "default_matrix_relaxation")]
    pub matrix_relaxation: f64,

    /// 定常 CFL 数
    #[serde(default = "default_cfl")]
    pub cfl: f64,

    /// 双时间步的伪时间 CFL 数
    #[serde(default = "default_cfl")]
    pub cfl_dual: f64,

    /// 外层迭代步数
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// 每个物理时间步的非线性子迭代数（>1 启用双时间步）
    #[serde(default = "default_nonlinear")]
    pub nonlinear_iterations: usize,

    /// 用户固定的物理时间步长（有量纲）；None 表示局部时间步
    #[serde(default)]
    pub fixed_dt: Option<f64>,

    /// 无量纲化参考长度 L_ref
    #[serde(default = "default_length_ref")]
    pub length_ref: f64,

    /// 无量纲化参考声速 a_ref（固定 Δt 的换算用）
    #[serde(default = "default_sound_speed_ref")]
    pub sound_speed_ref: f64,

    /// 方程组
    #[serde(default)]
    pub equation_set: EquationSet,

    /// 湍流模型名称（经能力集工厂解析）
    #[serde(default = "default_turbulence_model")]
    pub turbulence_model: String,

    /// 比热比 γ
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// 层流 Prandtl 数
    #[serde(default = "default_prandtl")]
    pub prandtl: f64,

    /// 湍流 Prandtl 数
    #[serde(default = "default_prandtl_turb")]
    pub prandtl_turb: f64,

    /// 参考 Reynolds 数（黏性无量纲化）
    #[serde(default = "default_reynolds")]
    pub reynolds: f64,

    /// 来流 Mach 数
    #[serde(default)]
    pub mach: f64,

    /// 来流方向（将被归一化；Mach = 0 时不使用）
    #[serde(default = "default_flow_direction")]
    pub flow_direction: [f64; 3],

    /// 幽灵层数 Gh
    #[serde(default = "default_ghost_layers")]
    pub ghost_layers: usize,

    /// 演示算例（CLI 用；求解器核心不读取）
    #[serde(default)]
    pub case: Option<CaseConfig>,
}

fn default_kappa() -> f64 {
    1.0 / 3.0
}
fn default_matrix_sweeps() -> usize {
    4
}
fn default_matrix_relaxation() -> f64 {
    1.0
}
fn default_cfl() -> f64 {
    0.5
}
fn default_iterations() -> usize {
    100
}
fn default_nonlinear() -> usize {
    1
}
fn default_length_ref() -> f64 {
    1.0
}
fn default_sound_speed_ref() -> f64 {
    1.0
}
fn default_turbulence_model() -> String {
    "none".to_string()
}
fn default_gamma() -> f64 {
    1.4
}
fn default_prandtl() -> f64 {
    0.72
}
fn default_prandtl_turb() -> f64 {
    0.9
}
fn default_reynolds() -> f64 {
    1.0e6
}
fn default_flow_direction() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}
fn default_ghost_layers() -> usize {
    2
}

impl Default for SolverInput {
    fn default() -> Self {
        serde_json::from_str("{}").expect("空配置必须可反序列化")
    }
}

impl SolverInput {
    /// 从 JSON 文件读入并校验
    pub fn from_json_file(path: impl AsRef<Path>) -> AfxResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let input: SolverInput = serde_json::from_str(&text)
            .map_err(|e| AfxError::config(format!("配置解析失败: {}", e)))?;
        input.validate()?;
        Ok(input)
    }

    /// Beam-Warming 时间算子的 θ
    #[inline]
    pub fn theta(&self) -> f64 {
        self.time_integration.theta()
    }

    /// Beam-Warming 时间算子的 ζ
    #[inline]
    pub fn zeta(&self) -> f64 {
        self.time_integration.zeta()
    }

    /// 是否启用双时间步
    #[inline]
    pub fn is_dual_time(&self) -> bool {
        self.time_integration.is_implicit() && self.nonlinear_iterations > 1
    }

    /// 取值校验
    pub fn validate(&self) -> AfxResult<()> {
        if !(self.kappa >= -1.0 && self.kappa <= 1.0) {
            return Err(AfxError::config(format!(
                "MUSCL κ = {} 不在 [-1, 1] 内",
                self.kappa
            )));
        }
        if !(self.matrix_relaxation > 0.0 && self.matrix_relaxation <= 1.0) {
            return Err(AfxError::config(format!(
                "矩阵松弛因子 σ = {} 不在 (0, 1] 内",
                self.matrix_relaxation
            )));
        }
        if self.cfl <= 0.0 || self.cfl_dual <= 0.0 {
            return Err(AfxError::config("CFL 数必须为正".to_string()));
        }
        if self.gamma <= 1.0 {
            return Err(AfxError::config(format!("γ = {} 必须大于 1", self.gamma)));
        }
        if self.length_ref <= 0.0 {
            return Err(AfxError::config("参考长度必须为正".to_string()));
        }
        if self.ghost_layers != 2 {
            return Err(AfxError::config(format!(
                "幽灵层数 {} 不受支持, 当前实现要求 2 层",
                self.ghost_layers
            )));
        }
        if let Some(dt) = self.fixed_dt {
            if dt <= 0.0 {
                return Err(AfxError::config("固定时间步长必须为正".to_string()));
            }
        }
        if self.mach < 0.0 {
            return Err(AfxError::config("Mach 数不能为负".to_string()));
        }
        Ok(())
    }
}

// ============================================================
// 演示算例
// ============================================================

/// CLI 演示算例描述：沿 i 方向等分的直角盒网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// 总单元数 (nI, nJ, nK)
    pub cells: [usize; 3],
    /// 盒子尺寸
    #[serde(default = "default_extent")]
    pub extent: [f64; 3],
    /// 沿 i 方向切分出的块数
    #[serde(default = "default_splits")]
    pub splits: usize,
    /// 六个外表面的边界标签，顺序 i-low, i-high, j-low, j-high, k-low, k-high
    #[serde(default = "default_boundaries")]
    pub boundaries: [String; 6],
}

fn default_extent() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}
fn default_splits() -> usize {
    1
}
fn default_boundaries() -> [String; 6] {
    core::array::from_fn(|_| "slipWall".to_string())
}
