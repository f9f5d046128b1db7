// ==========================================
// 采购风险评估 - 集成聚合器
// ==========================================
// 职责: 把多个智能体分数合并为最终分, 并以变异系数 (CV) 衡量分歧
// 公式: final = mean(scores); CV = 样本标准差 / final (n > 1 且 final > 0)
// 红线: 纯函数, 无副作用; 调用方保证至少一个分数
// 红线: high_uncertainty 与 confidence=low 共用同一阈值, 不可单独配置
// ==========================================

use crate::domain::analysis::{AgentScore, EnsembleResult, IndividualScore};
use crate::domain::types::{Confidence, HIGH_UNCERTAINTY_CV};
use crate::engine::agents::round4;

#[derive(Debug, Default)]
pub struct EnsembleAggregator;

impl EnsembleAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 聚合智能体分数
    ///
    /// # 前置条件
    /// scores 非空 (空列表是编排器的编程错误); 空输入时返回零分结果
    ///
    /// # 说明
    /// confidence 反映的是智能体之间的分歧度, 不是证据完整度:
    /// 单智能体集成的 CV 恒为 0, 置信度恒为 high
    pub fn aggregate(&self, scores: &[AgentScore]) -> EnsembleResult {
        debug_assert!(!scores.is_empty(), "ensemble requires at least one agent score");

        let n = scores.len();
        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();

        let final_score = if n == 0 {
            0.0
        } else {
            round4(values.iter().sum::<f64>() / n as f64)
        };

        // 全部为 0 时不除以均值, CV 定义为 0
        let coefficient_of_variation = if n > 1 && final_score > 0.0 {
            round4(sample_std_dev(&values) / final_score)
        } else {
            0.0
        };

        EnsembleResult {
            final_score,
            coefficient_of_variation,
            high_uncertainty: coefficient_of_variation > HIGH_UNCERTAINTY_CV,
            confidence: Confidence::from_cv(coefficient_of_variation),
            n_agents: n,
            individual_scores: scores
                .iter()
                .map(|s| IndividualScore {
                    agent: s.agent,
                    score: s.score,
                })
                .collect(),
        }
    }
}

/// 样本标准差 (除数 n - 1)
fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}
