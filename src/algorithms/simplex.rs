//! Nelder-Mead 单纯形最小化（无导数）
//!
//! 反射/扩展/收缩/缩小系数分别为 1、2、0.5、0.5；初始单纯形在每个非零坐标上
//! 朝原点方向扰动 5%，零坐标取 0.00025。达到迭代上限时仍返回当前最优点。
//!
//! 信标共面时（例如全部装在天花板上），平面两侧的镜像点目标函数值相同，
//! 结果可能落在任意一侧。

use crate::algorithms::Vec3;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;
const NONZERO_STEP: f64 = -0.05;
const ZERO_STEP: f64 = 0.00025;

/// 迭代参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimplexOptions {
    /// 最大迭代次数
    pub max_iterations: usize,
    /// 顶点间坐标差容差
    pub xatol: f64,
    /// 目标函数值差容差
    pub fatol: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        SimplexOptions {
            max_iterations: 1000,
            xatol: 1e-8,
            fatol: 1e-8,
        }
    }
}

/// 最小化结果
#[derive(Clone, Debug, PartialEq)]
pub struct SimplexResult {
    /// 找到的最优点
    pub point: Vec3,
    /// 最优点处的目标函数值
    pub value: f64,
    /// 执行的迭代次数
    pub iterations: usize,
    /// 是否在迭代上限前满足容差
    pub converged: bool,
}

/// 从 `start` 出发最小化 `objective`
pub fn minimize<F>(objective: F, start: Vec3, options: &SimplexOptions) -> SimplexResult
where
    F: Fn(&Vec3) -> f64,
{
    let mut simplex: Vec<(Vec3, f64)> = Vec::with_capacity(4);
    simplex.push((start, objective(&start)));
    for k in 0..3 {
        let mut vertex = start;
        vertex[k] = if vertex[k] != 0.0 {
            (1.0 + NONZERO_STEP) * vertex[k]
        } else {
            ZERO_STEP
        };
        simplex.push((vertex, objective(&vertex)));
    }
    sort_simplex(&mut simplex);

    let mut iterations = 1;
    let mut converged = false;

    while iterations < options.max_iterations {
        if within_tolerance(&simplex, options) {
            converged = true;
            break;
        }

        let worst = simplex[3].0;
        let centroid = (simplex[0].0 + simplex[1].0 + simplex[2].0) / 3.0;

        let reflected = centroid * (1.0 + REFLECTION) - worst * REFLECTION;
        let f_reflected = objective(&reflected);

        let mut shrink = false;
        if f_reflected < simplex[0].1 {
            let expanded =
                centroid * (1.0 + REFLECTION * EXPANSION) - worst * (REFLECTION * EXPANSION);
            let f_expanded = objective(&expanded);
            simplex[3] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
        } else if f_reflected < simplex[2].1 {
            simplex[3] = (reflected, f_reflected);
        } else if f_reflected < simplex[3].1 {
            // 外收缩
            let contracted = centroid * (1.0 + CONTRACTION * REFLECTION)
                - worst * (CONTRACTION * REFLECTION);
            let f_contracted = objective(&contracted);
            if f_contracted <= f_reflected {
                simplex[3] = (contracted, f_contracted);
            } else {
                shrink = true;
            }
        } else {
            // 内收缩
            let contracted = centroid * (1.0 - CONTRACTION) + worst * CONTRACTION;
            let f_contracted = objective(&contracted);
            if f_contracted < simplex[3].1 {
                simplex[3] = (contracted, f_contracted);
            } else {
                shrink = true;
            }
        }

        if shrink {
            let best = simplex[0].0;
            for vertex in simplex.iter_mut().skip(1) {
                let point = best + (vertex.0 - best) * SHRINK;
                *vertex = (point, objective(&point));
            }
        }

        iterations += 1;
        sort_simplex(&mut simplex);
    }

    let (point, value) = simplex[0];
    SimplexResult {
        point,
        value,
        iterations,
        converged,
    }
}

fn sort_simplex(simplex: &mut [(Vec3, f64)]) {
    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
}

fn within_tolerance(simplex: &[(Vec3, f64)], options: &SimplexOptions) -> bool {
    let (best, f_best) = simplex[0];
    let spread = simplex[1..]
        .iter()
        .map(|(v, _)| (v - best).amax())
        .fold(0.0, f64::max);
    let value_spread = simplex[1..]
        .iter()
        .map(|(_, f)| (f_best - f).abs())
        .fold(0.0, f64::max);
    spread <= options.xatol && value_spread <= options.fatol
}
