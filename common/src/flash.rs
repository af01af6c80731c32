use crate::{PhotoElectrons, Point3, SampleId};

/// Light observed on the photon sensors, one entry per channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flash {
    pub pe: Vec<PhotoElectrons>,
    pub pe_err: Vec<PhotoElectrons>,
    /// Left empty when the true light is unknown.
    pub pe_true: Vec<PhotoElectrons>,
    pub position: Point3,
    pub position_err: Point3,
    pub time: f64,
    pub id: Option<SampleId>,
}

impl Flash {
    pub fn total_pe(&self) -> PhotoElectrons {
        self.pe.iter().fold(0.0, |sum, pe| sum + pe)
    }

    pub fn total_true_pe(&self) -> PhotoElectrons {
        self.pe_true.iter().fold(0.0, |sum, pe| sum + pe)
    }

    pub fn num_channels(&self) -> usize {
        self.pe.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_totals() {
        let flash = Flash {
            pe: vec![1.0, 2.5, 0.5],
            ..Default::default()
        };
        assert_approx_eq!(flash.total_pe(), 4.0);
        assert_eq!(flash.num_channels(), 3);
    }

    #[test]
    fn test_unknown_true_light_sums_to_zero() {
        let flash = Flash::default();
        assert!(flash.total_true_pe().is_sign_positive());
        assert_eq!(flash.total_true_pe().to_string(), "0");
        assert!(flash.total_pe().is_sign_positive());
    }
}
