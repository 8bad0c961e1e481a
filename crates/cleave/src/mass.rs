pub const H2O: f64 = 18.010565;
pub const PROTON: f64 = 1.00727646688;

pub const VALID_AA: [u8; 22] = [
    b'A', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'K', b'L', b'M', b'N', b'P', b'Q', b'R', b'S',
    b'T', b'V', b'W', b'Y', b'U', b'O',
];

pub trait Mass {
    fn monoisotopic(&self) -> f64;
}

impl Mass for u8 {
    fn monoisotopic(&self) -> f64 {
        match self {
            b'A' => 71.037114,
            b'R' => 156.101111,
            b'N' => 114.042927,
            b'D' => 115.026943,
            b'C' => 103.009185,
            b'E' => 129.042593,
            b'Q' => 128.058578,
            b'G' => 57.021464,
            b'H' => 137.058912,
            b'I' => 113.084064,
            b'L' => 113.084064,
            b'K' => 128.094963,
            b'M' => 131.040485,
            b'F' => 147.068414,
            b'P' => 97.052764,
            b'S' => 87.032028,
            b'T' => 101.047679,
            b'W' => 186.079313,
            b'Y' => 163.06332,
            b'V' => 99.068414,
            b'U' => 150.95363,
            b'O' => 237.147727,
            _ => unreachable!("BUG: invalid amino acid {}", *self as char),
        }
    }
}

/// Is every residue of `sequence` part of the amino acid alphabet?
pub fn is_amino_acid_sequence(sequence: &str) -> bool {
    !sequence.is_empty() && sequence.bytes().all(|b| VALID_AA.contains(&b))
}

/// Unmodified monoisotopic mass of a peptide: the residue masses plus the
/// water added back by enzymatic hydrolysis.
///
/// Returns the first offending character if `sequence` contains anything
/// outside of [`VALID_AA`]
pub fn monoisotopic(sequence: &str) -> Result<f64, char> {
    let mut mass = H2O;
    for b in sequence.bytes() {
        if !VALID_AA.contains(&b) {
            return Err(b as char);
        }
        mass += b.monoisotopic();
    }
    Ok(mass)
}

/// Theoretical mass-to-charge ratio of a neutral `mass` carrying `charge` protons
pub fn ion_mz(mass: f64, charge: u8) -> f64 {
    let z = charge as f64;
    (mass + z * PROTON) / z
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn smoke() {
        for ch in VALID_AA {
            assert!(ch.monoisotopic() > 0.0);
        }
    }

    #[test]
    fn peptide_mass() {
        let mass = monoisotopic("PEPTIDE").unwrap();
        assert!((mass - 799.359965).abs() < 1E-5, "{}", mass);
        assert_eq!(monoisotopic("PEPXIDE"), Err('X'));
        assert_eq!(monoisotopic(""), Ok(H2O));
    }

    #[test]
    fn mass_to_charge() {
        let mass = monoisotopic("PEPTIDE").unwrap();
        assert!((ion_mz(mass, 1) - 800.367241).abs() < 1E-5);
        assert!((ion_mz(mass, 2) - 400.687259).abs() < 1E-5);
        assert!((ion_mz(mass, 3) - 267.460598).abs() < 1E-5);
    }

    #[test]
    fn alphabet() {
        assert!(is_amino_acid_sequence("MADEEK"));
        assert!(!is_amino_acid_sequence("MADBEEK"));
        assert!(!is_amino_acid_sequence("madeek"));
        assert!(!is_amino_acid_sequence(""));
    }
}
