//! Cash-flow forecaster: feature builder, scaler and forest trained together

use crate::config::ForecastConfig;
use crate::data::{ensure_chronological, FinancialRecord};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureBuilder, QuarterEncoding};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::models::random_forest::RandomForestRegressor;
use crate::models::{ForecastResult, Regressor};
use crate::projector::HorizonProjector;
use crate::scaler::StandardScaler;
use crate::utils::{shift_forward_fill, train_test_split_indices};
use tracing::{debug, info};

/// Everything produced by one training run.
///
/// The quarter encoding and scaler are the ones fitted on the training
/// history; projection must reuse them so feature columns line up.
#[derive(Debug, Clone)]
pub struct TrainedCashflowModel {
    builder: FeatureBuilder,
    quarters: QuarterEncoding,
    scaler: StandardScaler,
    forest: RandomForestRegressor,
    feature_names: Vec<String>,
    horizon_days: usize,
    holdout_features: Vec<Vec<f64>>,
    holdout_targets: Vec<f64>,
    trained_rows: usize,
}

impl TrainedCashflowModel {
    /// Scale raw feature rows and run them through the forest
    pub fn predict_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let scaled = self.scaler.transform_rows(rows)?;
        self.forest.predict(&scaled)
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn quarters(&self) -> &QuarterEncoding {
        &self.quarters
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Horizon the training targets were shifted by
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// Rows used to fit the scaler and forest
    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }

    /// Rows kept aside for [`CashflowForecaster::evaluate_holdout`]
    pub fn holdout_rows(&self) -> usize {
        self.holdout_targets.len()
    }

    /// Feature names ordered by forest importance
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        self.forest.feature_importance_ranking(&self.feature_names)
    }
}

/// Lazily trained cash-flow forecaster.
///
/// The first call to [`predict`](Self::predict) trains on the history it is
/// given. Later calls reuse that model, whatever horizon they ask for, until
/// [`retrain`](Self::retrain) or [`reset`](Self::reset) is called.
#[derive(Debug, Clone)]
pub struct CashflowForecaster {
    config: ForecastConfig,
    builder: FeatureBuilder,
    model: Option<TrainedCashflowModel>,
}

impl CashflowForecaster {
    /// Create an untrained forecaster
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        let builder = FeatureBuilder::from_config(&config)?;
        Ok(Self {
            config,
            builder,
            model: None,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// The trained model, or `ModelNotTrained`
    pub fn trained(&self) -> Result<&TrainedCashflowModel> {
        self.model.as_ref().ok_or(ForecastError::ModelNotTrained)
    }

    /// Drop the trained model
    pub fn reset(&mut self) {
        self.model = None;
    }

    /// Train on `history` so that row `i` learns the net cash flow `horizon_days` ahead
    pub fn train(
        &mut self,
        history: &[FinancialRecord],
        horizon_days: usize,
    ) -> Result<&TrainedCashflowModel> {
        ensure_chronological(history)?;
        if horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be at least 1".to_string(),
            ));
        }

        let (quarters, matrix) = self.builder.fit_build(history)?;
        let net = matrix.column("net_cashflow").ok_or_else(|| {
            ForecastError::DataError("Feature matrix is missing net_cashflow".to_string())
        })?;
        let targets = shift_forward_fill(&net, horizon_days);
        let feature_names = matrix.names().to_vec();
        let rows = matrix.into_rows();

        let (train_idx, holdout_idx) = train_test_split_indices(
            rows.len(),
            self.config.train_test_split_ratio,
            self.config.random_seed,
        )?;
        debug!(
            train = train_idx.len(),
            holdout = holdout_idx.len(),
            "split training rows"
        );

        let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

        let scaler = StandardScaler::fit(&train_rows)?;
        let scaled = scaler.transform_rows(&train_rows)?;

        let mut forest =
            RandomForestRegressor::new(self.config.forest.clone(), self.config.random_seed);
        forest.fit(&scaled, &train_targets)?;

        let holdout_raw: Vec<Vec<f64>> = holdout_idx.iter().map(|&i| rows[i].clone()).collect();
        let holdout_features = scaler.transform_rows(&holdout_raw)?;
        let holdout_targets = holdout_idx.iter().map(|&i| targets[i]).collect();

        info!(
            rows = rows.len(),
            trained_rows = train_idx.len(),
            features = feature_names.len(),
            trees = forest.n_trees(),
            horizon_days,
            "trained cash-flow forecaster"
        );

        let model = TrainedCashflowModel {
            builder: self.builder,
            quarters,
            scaler,
            forest,
            feature_names,
            horizon_days,
            holdout_features,
            holdout_targets,
            trained_rows: train_idx.len(),
        };
        Ok(&*self.model.insert(model))
    }

    /// Discard any existing model and train a new one
    pub fn retrain(
        &mut self,
        history: &[FinancialRecord],
        horizon_days: usize,
    ) -> Result<&TrainedCashflowModel> {
        self.reset();
        self.train(history, horizon_days)
    }

    /// Forecast the `horizon_days` days after the end of `history`, training first if needed
    pub fn predict(
        &mut self,
        history: &[FinancialRecord],
        horizon_days: usize,
    ) -> Result<ForecastResult> {
        ensure_chronological(history)?;
        if horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be at least 1".to_string(),
            ));
        }

        if self.model.is_none() {
            self.train(history, horizon_days)?;
        }
        let model = self.trained()?;

        let forecast = HorizonProjector::new(model).project(history, horizon_days)?;
        info!(
            horizon_days,
            total = forecast.total_cashflow(),
            "projected cash flow"
        );
        Ok(forecast)
    }

    /// Score the forest on the rows held out during training
    pub fn evaluate_holdout(&self) -> Result<ForecastAccuracy> {
        let model = self.trained()?;
        if model.holdout_targets.is_empty() {
            return Err(ForecastError::DataError(
                "No held-out rows to evaluate".to_string(),
            ));
        }
        let predictions = model.forest.predict(&model.holdout_features)?;
        forecast_accuracy(&predictions, &model.holdout_targets)
    }
}

impl Default for CashflowForecaster {
    fn default() -> Self {
        Self {
            config: ForecastConfig::default(),
            builder: FeatureBuilder::default(),
            model: None,
        }
    }
}
