//! Processing requests: validation gate plus transform fan-out.
//!
//! Nothing is computed until the request carries a name, a valid
//! registration number and at least one operation. The resulting
//! `Processed` value holds everything the report builder needs.

use image::RgbImage;
use tracing::info;

use crate::models::{Inputs, Operation, OperationSelection, Parameter, ResultSet};
use crate::registration::{check_registration, RegistrationError};
use crate::report::ReportContent;
use crate::transform::{self, TransformError};

/// Everything a user submits for one processing cycle.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    pub name: String,
    pub registration: String,
    pub inputs: Inputs,
    pub selection: OperationSelection,
    /// `None` uses the mode default (scalar 50 or weight 0.5).
    pub parameter: Option<Parameter>,
}

/// Validated request with its Result Set. Pair inputs are already resized
/// to a common shape.
#[derive(Debug, Clone)]
pub struct Processed {
    pub name: String,
    pub registration: String,
    pub inputs: Inputs,
    pub parameter: Parameter,
    pub results: ResultSet,
}

impl Processed {
    pub fn report_content(&self) -> ReportContent<'_> {
        ReportContent {
            name: &self.name,
            identifier: &self.registration,
            inputs: &self.inputs,
            parameter: Some(self.parameter),
            results: &self.results,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Please enter your name")]
    MissingName,
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("Please select at least one operation")]
    NoOperationSelected,
    #[error("{expected} parameter required for {mode} mode")]
    ParameterMismatch {
        expected: &'static str,
        mode: &'static str,
    },
    #[error("Weight must be between 0.0 and 1.0, got {0}")]
    WeightOutOfRange(f32),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Validate `request` and apply every selected operation in checklist order.
pub fn process(request: ProcessingRequest) -> Result<Processed, ProcessingError> {
    let ProcessingRequest {
        name,
        registration,
        inputs,
        selection,
        parameter,
    } = request;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ProcessingError::MissingName);
    }
    // Full match on the raw input; surrounding whitespace is a format error.
    check_registration(&registration)?;

    if selection.is_empty() {
        return Err(ProcessingError::NoOperationSelected);
    }

    let parameter = resolve_parameter(&inputs, parameter)?;
    let inputs = align_inputs(inputs);

    let mut results = ResultSet::new();
    for op in selection.resolved() {
        let output = apply(&inputs, op, parameter)?;
        results.insert(op, output);
    }

    info!(
        operations = ?results.operations(),
        pair = inputs.is_pair(),
        parameter = %parameter.describe(),
        "Images processed"
    );

    Ok(Processed {
        name,
        registration,
        inputs,
        parameter,
        results,
    })
}

fn resolve_parameter(
    inputs: &Inputs,
    parameter: Option<Parameter>,
) -> Result<Parameter, ProcessingError> {
    match (inputs, parameter) {
        (_, None) => Ok(inputs.default_parameter()),
        (Inputs::Single(_), Some(p @ Parameter::Scalar(_))) => Ok(p),
        (Inputs::Pair { .. }, Some(Parameter::Weight(w))) => {
            if w.is_finite() && (0.0..=1.0).contains(&w) {
                Ok(Parameter::Weight(w))
            } else {
                Err(ProcessingError::WeightOutOfRange(w))
            }
        }
        (Inputs::Single(_), Some(Parameter::Weight(_))) => {
            Err(ProcessingError::ParameterMismatch {
                expected: "Scalar",
                mode: "single-image",
            })
        }
        (Inputs::Pair { .. }, Some(Parameter::Scalar(_))) => {
            Err(ProcessingError::ParameterMismatch {
                expected: "Weight",
                mode: "two-image",
            })
        }
    }
}

fn align_inputs(inputs: Inputs) -> Inputs {
    match inputs {
        Inputs::Pair { first, second } => {
            let second = transform::match_dimensions(&first, &second);
            Inputs::Pair { first, second }
        }
        single => single,
    }
}

fn apply(inputs: &Inputs, op: Operation, parameter: Parameter) -> Result<RgbImage, ProcessingError> {
    let output = match (inputs, parameter) {
        (Inputs::Single(img), Parameter::Scalar(value)) => transform::apply_scalar(img, op, value),
        (Inputs::Pair { first, second }, Parameter::Weight(weight)) => {
            transform::apply_blend(first, second, op, weight)?
        }
        // resolve_parameter guarantees the pairing
        (Inputs::Single(_), Parameter::Weight(_)) => {
            return Err(ProcessingError::ParameterMismatch {
                expected: "Scalar",
                mode: "single-image",
            })
        }
        (Inputs::Pair { .. }, Parameter::Scalar(_)) => {
            return Err(ProcessingError::ParameterMismatch {
                expected: "Weight",
                mode: "two-image",
            })
        }
    };
    Ok(output)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn red(size: u32) -> RgbImage {
        RgbImage::from_pixel(size, size, Rgb([255, 0, 0]))
    }

    fn single_request(selection: OperationSelection, value: Option<u8>) -> ProcessingRequest {
        ProcessingRequest {
            name: "Ayesha Khan".into(),
            registration: "2023-AG-0001".into(),
            inputs: Inputs::Single(red(10)),
            selection,
            parameter: value.map(Parameter::Scalar),
        }
    }

    #[test]
    fn single_addition_produces_one_entry() {
        let processed = process(single_request(
            OperationSelection::only([Operation::Addition]),
            Some(10),
        ))
        .unwrap();

        assert_eq!(processed.results.len(), 1);
        let out = processed.results.get(Operation::Addition).unwrap();
        assert!(out.pixels().all(|p| *p == Rgb([255, 10, 10])));
    }

    #[test]
    fn select_all_produces_four_entries_in_order() {
        let processed = process(single_request(OperationSelection::all(), None)).unwrap();
        assert_eq!(processed.results.operations(), Operation::ALL.to_vec());
        assert_eq!(processed.parameter, Parameter::Scalar(50));
    }

    #[test]
    fn blank_name_rejected() {
        let mut request = single_request(OperationSelection::all(), None);
        request.name = "   ".into();
        assert!(matches!(process(request), Err(ProcessingError::MissingName)));
    }

    #[test]
    fn invalid_registration_rejected() {
        let mut request = single_request(OperationSelection::all(), None);
        request.registration = "2023-ag-1".into();
        let err = process(request).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Registration(RegistrationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn padded_registration_rejected() {
        let mut request = single_request(OperationSelection::all(), None);
        request.registration = " 2023-AG-0001 ".into();
        let err = process(request).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Registration(RegistrationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn no_operation_rejected() {
        let request = single_request(OperationSelection::default(), Some(10));
        let err = process(request).unwrap_err();
        assert!(matches!(err, ProcessingError::NoOperationSelected));
        assert_eq!(err.to_string(), "Please select at least one operation");
    }

    #[test]
    fn weight_in_single_mode_rejected() {
        let mut request = single_request(OperationSelection::all(), None);
        request.parameter = Some(Parameter::Weight(0.5));
        assert!(matches!(
            process(request),
            Err(ProcessingError::ParameterMismatch { .. })
        ));
    }

    #[test]
    fn pair_mode_resizes_second_and_blends() {
        let request = ProcessingRequest {
            name: "Bilal".into(),
            registration: "2021-ag-4321".into(),
            inputs: Inputs::Pair {
                first: RgbImage::from_pixel(8, 6, Rgb([200, 100, 0])),
                second: RgbImage::from_pixel(3, 3, Rgb([100, 100, 100])),
            },
            selection: OperationSelection::only([Operation::Addition]),
            parameter: None,
        };
        let processed = process(request).unwrap();

        let Inputs::Pair { second, .. } = &processed.inputs else {
            panic!("expected pair inputs");
        };
        assert_eq!(second.dimensions(), (8, 6));
        assert_eq!(processed.parameter, Parameter::Weight(0.5));

        let out = processed.results.get(Operation::Addition).unwrap();
        assert_eq!(out.dimensions(), (8, 6));
        assert_eq!(out.get_pixel(4, 3), &Rgb([150, 100, 50]));
    }

    #[test]
    fn pair_mode_rejects_weight_out_of_range() {
        let request = ProcessingRequest {
            name: "Bilal".into(),
            registration: "2021-AG-4321".into(),
            inputs: Inputs::Pair {
                first: red(4),
                second: red(4),
            },
            selection: OperationSelection::all(),
            parameter: Some(Parameter::Weight(1.5)),
        };
        assert!(matches!(
            process(request),
            Err(ProcessingError::WeightOutOfRange(_))
        ));
    }

    #[test]
    fn report_content_borrows_processed_fields() {
        let processed = process(single_request(
            OperationSelection::only([Operation::Subtraction]),
            Some(5),
        ))
        .unwrap();
        let content = processed.report_content();
        assert_eq!(content.name, "Ayesha Khan");
        assert_eq!(content.identifier, "2023-AG-0001");
        assert_eq!(content.results.len(), 1);
    }
}
