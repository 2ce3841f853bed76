use odbc_api::parameter::InputParameter;
use odbc_api::{Bit, IntoParameter};

use crate::types::RowValues;

/// Box a slice of `RowValues` as ODBC input parameters.
///
/// The driver wants one boxed parameter per `?` marker; a slice of boxes is
/// what `Connection::execute` accepts when the parameter count is only known
/// at runtime.
pub(crate) fn to_odbc_params(params: &[RowValues]) -> Vec<Box<dyn InputParameter>> {
    params.iter().map(to_odbc_param).collect()
}

fn to_odbc_param(value: &RowValues) -> Box<dyn InputParameter> {
    match value {
        RowValues::Int(i) => Box::new((*i).into_parameter()),
        RowValues::Float(f) => Box::new((*f).into_parameter()),
        RowValues::Text(s) => Box::new(s.clone().into_parameter()),
        RowValues::Bool(b) => Box::new(Bit(u8::from(*b)).into_parameter()),
        RowValues::Timestamp(dt) => {
            Box::new(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string().into_parameter())
        }
        RowValues::Null => Box::new(Option::<String>::None.into_parameter()),
        RowValues::JSON(jsval) => Box::new(jsval.to_string().into_parameter()),
        RowValues::Blob(bytes) => Box::new(bytes.clone().into_parameter()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_boxes() {
        let dt = chrono::NaiveDateTime::parse_from_str("2024-05-01 13:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let values = vec![
            RowValues::Int(1),
            RowValues::Float(2.5),
            RowValues::Text("x".into()),
            RowValues::Bool(true),
            RowValues::Timestamp(dt),
            RowValues::Null,
            RowValues::JSON(serde_json::json!({"k": 1})),
            RowValues::Blob(vec![1, 2, 3]),
        ];
        assert_eq!(to_odbc_params(&values).len(), values.len());
    }
}
