//! Positional layout of the FAR3D `Input_Model` namelist.

/// Length of a vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorLen {
    /// Fixed number of elements.
    Fixed(usize),
    /// Length given by an integer field decoded earlier.
    Field(&'static str),
}

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer scalar.
    Int,
    /// Real scalar.
    Float,
    /// Fortran logical.
    Bool,
    /// Free text, trimmed.
    Text,
    /// Integer vector.
    IntVector(VectorLen),
    /// Real vector.
    FloatVector(VectorLen),
}

impl FieldKind {
    /// Human-readable kind, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Int => "an integer",
            FieldKind::Float => "a float",
            FieldKind::Bool => "a logical",
            FieldKind::Text => "a string",
            FieldKind::IntVector(_) => "an integer vector",
            FieldKind::FloatVector(_) => "a float vector",
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name as used by FAR3D.
    pub name: &'static str,
    /// Value type.
    pub kind: FieldKind,
    /// Section header lines written before the field's own label line.
    pub preamble: &'static [&'static str],
}

impl FieldSpec {
    /// Lines preceding the value: the preamble plus one label line.
    pub fn leading_lines(&self) -> usize {
        self.preamble.len() + 1
    }
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        preamble: &[],
    }
}

const fn section(
    name: &'static str,
    kind: FieldKind,
    preamble: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        preamble,
    }
}

use FieldKind::{Bool, Float, FloatVector, Int, IntVector, Text};

const PROFILE_COEFFS: FieldKind = FloatVector(VectorLen::Fixed(11));

/// Field order of `Input_Model`. Changing it desynchronises every later field.
pub const NAMELIST_SCHEMA: &[FieldSpec] = &[
    section("nstres", Int, &["! FAR3D input namelist"]),
    field("numrun", Text),
    field("numruno", Text),
    field("numvac", Int),
    field("nonlin", Int),
    field("ngeneq", Int),
    field("eq_name", Text),
    field("maxstp", Int),
    field("dt0", Float),
    field("ldim", Int),
    field("leqdim", Int),
    field("jdim", Int),
    field("ext_prof", Int),
    field("ext_prof_name", Text),
    field("ext_prof_len", Int),
    field("iflr_on", Int),
    field("epflr_on", Int),
    field("ieldamp_on", Int),
    field("twofl_on", Int),
    field("alpha_on", Int),
    field("Trapped_on", Int),
    field("matrix_out", Bool),
    field("m0dy", Int),
    section(
        "mm",
        IntVector(VectorLen::Field("ldim")),
        &[
            "!---- Mode selection ----",
            "! dynamic (mm, nn) and equilibrium (mmeq, nneq) mode numbers",
            "!",
        ],
    ),
    field("nn", IntVector(VectorLen::Field("ldim"))),
    field("mmeq", IntVector(VectorLen::Field("leqdim"))),
    field("nneq", IntVector(VectorLen::Field("leqdim"))),
    section("ipert", Int, &["!---- Perturbation and radial grid ----"]),
    field("widthi", Float),
    field("Auto_grid_on", Int),
    field("ni", Int),
    field("nis", Int),
    field("ne", Int),
    field("delta", Float),
    field("rc", Float),
    field("Edge_on", Int),
    field("edge_p", Int),
    section("gamma", Int, &["!---- Equilibrium and physics ----"]),
    field("s", Float),
    field("betath_factor", Int),
    field("ietaeq", Int),
    field("bet0_f", Float),
    field("bet0_falp", Float),
    field("omcy", Float),
    field("omcyb", Float),
    field("rbound", Float),
    field("omcyalp", Float),
    field("itime", Int),
    field("dpres", Float),
    section("stdifp", Int, &["!---- Dissipation ----"]),
    field("stdifu", Int),
    field("stdifv", Int),
    field("stdifnf", Int),
    field("stdifvf", Int),
    field("stdifnfalp", Int),
    field("stdifvfalp", Int),
    section("LcA0", Float, &["!---- Landau closure ----"]),
    field("LcA1", Float),
    field("LcA2", Float),
    field("LcA3", Float),
    field("LcA0alp", Float),
    field("LcA1alp", Float),
    field("LcA2alp", Float),
    field("LcA3alp", Float),
    section("omegar", Float, &["!---- Finite Larmor radius ----"]),
    field("iflr", Float),
    field("r_epflr", Float),
    field("r_epflralp", Float),
    section("lplots", Int, &["!---- Output ----"]),
    field("nprint", Int),
    field("ndump", Int),
    section("DIIID_u", Int, &["!---- Units ----"]),
    section(
        "EP_dens_on",
        Int,
        &["!---- Analytic profiles ----", "! density, velocity and q switches"],
    ),
    field("Adens", Int),
    field("Bdens", Float),
    field("Alpha_dens_on", Int),
    field("Adensalp", Int),
    field("Bdensalp", Float),
    field("EP_vel_on", Int),
    field("Alpha_vel_on", Int),
    field("q_prof_on", Int),
    field("Eq_vel_on", Int),
    field("Eq_velp_on", Int),
    field("Eq_Presseq_on", Int),
    field("Eq_Presstot_on", Int),
    field("deltaq", Int),
    field("deltaiota", Int),
    field("etascl", Int),
    field("eta0", Int),
    field("reta", Float),
    field("etalmb", Float),
    field("cnep", PROFILE_COEFFS),
    field("ctep", PROFILE_COEFFS),
    field("cnfp", PROFILE_COEFFS),
    field("cvep", PROFILE_COEFFS),
    field("cvfp", PROFILE_COEFFS),
    field("cnfpalp", PROFILE_COEFFS),
    field("cvfpalp", PROFILE_COEFFS),
    field("eqvt", PROFILE_COEFFS),
    field("eqvp", PROFILE_COEFFS),
];

/// Schema position of a field, ignoring ASCII case.
pub fn field_index(name: &str) -> Option<usize> {
    NAMELIST_SCHEMA
        .iter()
        .position(|spec| spec.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_ignoring_case() {
        for (i, spec) in NAMELIST_SCHEMA.iter().enumerate() {
            assert_eq!(field_index(spec.name), Some(i), "duplicate {}", spec.name);
        }
    }

    #[test]
    fn length_fields_precede_their_vectors() {
        for (i, spec) in NAMELIST_SCHEMA.iter().enumerate() {
            if let FieldKind::IntVector(VectorLen::Field(len))
            | FieldKind::FloatVector(VectorLen::Field(len)) = spec.kind
            {
                let pos = field_index(len).unwrap();
                assert!(pos < i);
                assert_eq!(NAMELIST_SCHEMA[pos].kind, FieldKind::Int);
            }
        }
    }
}
