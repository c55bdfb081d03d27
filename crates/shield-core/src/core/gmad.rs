//! GMAD machine description serialization.
//!
//! The simulation engine consumes lattices in the GMAD text format: element
//! definitions, a beamline composed of those elements, standalone placements,
//! a beam definition, and an options block. [`Machine`] accumulates the
//! pieces in declaration order and writes the whole file at once, so a
//! lattice builder reads like the beamline it describes.

use std::io::{self, Write};

/// A beamline element definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Drift {
        name: String,
        length: f64,
    },
    Dipole {
        name: String,
        length: f64,
        angle: f64,
        /// Quadrupole gradient for combined-function magnets.
        k1: Option<f64>,
    },
    /// Rectangular collimator; the shielding block under study.
    RCol {
        name: String,
        length: f64,
        material: String,
        x_size: f64,
        y_size: f64,
        horizontal_width: f64,
        offset_x: f64,
    },
}

impl Element {
    fn name(&self) -> &str {
        match self {
            Element::Drift { name, .. }
            | Element::Dipole { name, .. }
            | Element::RCol { name, .. } => name,
        }
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            Element::Drift { name, length } => {
                writeln!(writer, "{name}: drift, l={length};")
            }
            Element::Dipole {
                name,
                length,
                angle,
                k1,
            } => match k1 {
                Some(k1) => writeln!(writer, "{name}: sbend, l={length}, angle={angle}, k1={k1};"),
                None => writeln!(writer, "{name}: sbend, l={length}, angle={angle};"),
            },
            Element::RCol {
                name,
                length,
                material,
                x_size,
                y_size,
                horizontal_width,
                offset_x,
            } => writeln!(
                writer,
                "{name}: rcol, l={length}, material=\"{material}\", xsize={x_size}, \
                 ysize={y_size}, horizontalWidth={horizontal_width}, offsetX={offset_x};"
            ),
        }
    }
}

/// A placement of an externally defined element relative to a beamline one.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub name: String,
    pub element: String,
    pub reference: String,
    pub x: f64,
}

/// Gaussian-Twiss beam definition.
///
/// Defaults are the 50 GeV electron beam at the entrance of the simple
/// dipole interaction region; the optimised region re-matches the twiss
/// parameters via [`Beam::quads_ir`].
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub particle: String,
    pub energy: f64,
    pub x0: f64,
    pub xp0: f64,
    pub y0: f64,
    pub yp0: f64,
    pub alfx: f64,
    pub alfy: f64,
    pub betx: f64,
    pub bety: f64,
    pub dispx: f64,
    pub dispxp: f64,
    pub dispy: f64,
    pub dispyp: f64,
    pub emitx: f64,
    pub emity: f64,
    pub sigma_e: f64,
}

impl Default for Beam {
    fn default() -> Self {
        Self {
            particle: "e-".to_string(),
            energy: 50.0,
            x0: 0.0,
            xp0: 0.0,
            y0: 0.0,
            yp0: 0.0,
            alfx: 150.0,
            alfy: 150.0,
            betx: 2250.0,
            bety: 2250.0,
            dispx: 0.1337,
            dispxp: 0.0121997,
            dispy: 0.1337,
            dispyp: 0.0121997,
            emitx: 0.5e-9,
            emity: 0.5e-9,
            sigma_e: 0.00028,
        }
    }
}

impl Beam {
    /// The same beam re-matched at the entrance of the optimised
    /// quads-half-quads interaction region.
    pub fn quads_ir() -> Self {
        Self {
            alfx: -0.035622,
            alfy: 99.948526,
            betx: 0.090510,
            bety: 4881.193917,
            ..Self::default()
        }
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(
            writer,
            "beam, particle=\"{}\", energy={}, distrType=\"gausstwiss\",\n\
             \tX0={}, Xp0={}, Y0={}, Yp0={},\n\
             \talfx={}, alfy={}, betx={}, bety={},\n\
             \tdispx={}, dispxp={}, dispy={}, dispyp={},\n\
             \temitx={}, emity={}, sigmaE={};",
            self.particle,
            self.energy,
            self.x0,
            self.xp0,
            self.y0,
            self.yp0,
            self.alfx,
            self.alfy,
            self.betx,
            self.bety,
            self.dispx,
            self.dispxp,
            self.dispy,
            self.dispyp,
            self.emitx,
            self.emity,
            self.sigma_e,
        )
    }
}

/// Simulation options block.
///
/// Defaults match the synchrotron-radiation study setup: the `synch_rad em`
/// physics list, an elliptical copper beampipe, and a vacuum world.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub physics_list: String,
    pub magnet_geometry_type: String,
    pub beampipe_material: String,
    pub aperture_type: String,
    pub aper1: f64,
    pub aper2: f64,
    pub horizontal_width: f64,
    pub world_material: String,
    pub maximum_step_length: f64,
    pub preprocess_gdml: bool,
    pub h_style: bool,
    /// Tracking integrator set; `None` leaves the engine default.
    pub integrator_set: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            physics_list: "synch_rad em".to_string(),
            magnet_geometry_type: "none".to_string(),
            beampipe_material: "Cu".to_string(),
            aperture_type: "elliptical".to_string(),
            aper1: 0.5,
            aper2: 0.3,
            horizontal_width: 1.05,
            world_material: "vacuum".to_string(),
            maximum_step_length: 0.1,
            preprocess_gdml: false,
            h_style: true,
            integrator_set: None,
        }
    }
}

impl Options {
    /// Options of the optimised interaction region, which tracks through its
    /// combined-function magnets with the `geant4` integrator set.
    pub fn quads_ir() -> Self {
        Self {
            integrator_set: Some("geant4".to_string()),
            ..Self::default()
        }
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(
            writer,
            "option, physicsList=\"{}\",\n\
             \tmagnetGeometryType=\"{}\",\n\
             \tbeampipeMaterial=\"{}\",\n\
             \tapertureType=\"{}\", aper1={}, aper2={},\n\
             \thorizontalWidth={},\n\
             \tworldMaterial=\"{}\",\n\
             \tmaximumStepLength={},\n\
             \tpreprocessGDML={}, hStyle={}",
            self.physics_list,
            self.magnet_geometry_type,
            self.beampipe_material,
            self.aperture_type,
            self.aper1,
            self.aper2,
            self.horizontal_width,
            self.world_material,
            self.maximum_step_length,
            self.preprocess_gdml as u8,
            self.h_style as u8,
        )?;
        if let Some(integrator_set) = &self.integrator_set {
            write!(writer, ",\n\tintegratorSet=\"{integrator_set}\"")?;
        }
        writeln!(writer, ";")
    }
}

/// An ordered GMAD machine description.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Machine {
    includes: Vec<String>,
    elements: Vec<Element>,
    placements: Vec<Placement>,
    sample_all: bool,
    beam: Option<Beam>,
    options: Option<Options>,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include another GMAD file before the lattice definition.
    pub fn add_include(&mut self, file: impl Into<String>) -> &mut Self {
        self.includes.push(file.into());
        self
    }

    pub fn add_drift(&mut self, name: impl Into<String>, length: f64) -> &mut Self {
        self.elements.push(Element::Drift {
            name: name.into(),
            length,
        });
        self
    }

    pub fn add_dipole(&mut self, name: impl Into<String>, length: f64, angle: f64) -> &mut Self {
        self.elements.push(Element::Dipole {
            name: name.into(),
            length,
            angle,
            k1: None,
        });
        self
    }

    pub fn add_combined_dipole(
        &mut self,
        name: impl Into<String>,
        length: f64,
        angle: f64,
        k1: f64,
    ) -> &mut Self {
        self.elements.push(Element::Dipole {
            name: name.into(),
            length,
            angle,
            k1: Some(k1),
        });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_rcol(
        &mut self,
        name: impl Into<String>,
        length: f64,
        material: impl Into<String>,
        x_size: f64,
        y_size: f64,
        horizontal_width: f64,
        offset_x: f64,
    ) -> &mut Self {
        self.elements.push(Element::RCol {
            name: name.into(),
            length,
            material: material.into(),
            x_size,
            y_size,
            horizontal_width,
            offset_x,
        });
        self
    }

    pub fn add_placement(
        &mut self,
        name: impl Into<String>,
        element: impl Into<String>,
        reference: impl Into<String>,
        x: f64,
    ) -> &mut Self {
        self.placements.push(Placement {
            name: name.into(),
            element: element.into(),
            reference: reference.into(),
            x,
        });
        self
    }

    /// Attach a sampler to every element in the beamline.
    pub fn sample_all(&mut self) -> &mut Self {
        self.sample_all = true;
        self
    }

    pub fn set_beam(&mut self, beam: Beam) -> &mut Self {
        self.beam = Some(beam);
        self
    }

    pub fn set_options(&mut self, options: Options) -> &mut Self {
        self.options = Some(options);
        self
    }

    /// Serialize the machine in GMAD declaration order: includes, elements,
    /// the beamline, placements, samplers, beam, options.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for include in &self.includes {
            writeln!(writer, "include {include};")?;
        }
        if !self.includes.is_empty() {
            writeln!(writer)?;
        }

        for element in &self.elements {
            element.write_to(writer)?;
        }

        let line: Vec<&str> = self.elements.iter().map(Element::name).collect();
        writeln!(writer, "\nmachine: line=({});", line.join(", "))?;
        writeln!(writer, "use, period=machine;")?;

        for placement in &self.placements {
            writeln!(
                writer,
                "{}: placement, bdsimElement=\"{}\", referenceElement=\"{}\", x={};",
                placement.name, placement.element, placement.reference, placement.x
            )?;
        }

        if self.sample_all {
            writeln!(writer, "sample, all;")?;
        }

        if let Some(beam) = &self.beam {
            writeln!(writer)?;
            beam.write_to(writer)?;
        }
        if let Some(options) = &self.options {
            writeln!(writer)?;
            options.write_to(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(machine: &Machine) -> String {
        let mut out = Vec::new();
        machine.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn elements_render_in_declaration_order() {
        let mut machine = Machine::new();
        machine
            .add_drift("DRIFT_0", 5.0)
            .add_dipole("BEND_0", 20.0, 0.0244)
            .add_drift("DRIFT_1", 4.95);
        let text = render(&machine);

        assert!(text.contains("DRIFT_0: drift, l=5;"));
        assert!(text.contains("BEND_0: sbend, l=20, angle=0.0244;"));
        assert!(text.contains("machine: line=(DRIFT_0, BEND_0, DRIFT_1);"));
        assert!(text.contains("use, period=machine;"));
    }

    #[test]
    fn rcol_and_placement_render_all_fields() {
        let mut machine = Machine::new();
        machine
            .add_drift("DRIFT_0", 1.0)
            .add_rcol("COL_0", 0.05, "Pb", 0.02, 0.02, 0.233792, 0.121896)
            .add_placement("COL_1_p", "COL_1", "COL_0", 0.355688);
        let text = render(&machine);

        assert!(text.contains("COL_0: rcol, l=0.05, material=\"Pb\", xsize=0.02"));
        assert!(text.contains(
            "COL_1_p: placement, bdsimElement=\"COL_1\", referenceElement=\"COL_0\", x=0.355688;"
        ));
    }

    #[test]
    fn combined_function_dipole_carries_k1() {
        let mut machine = Machine::new();
        machine.add_combined_dipole("uBEND_QX", 2.1771258, 0.002072436, 0.18067);
        assert!(render(&machine).contains("k1=0.18067;"));
    }

    #[test]
    fn beam_and_options_blocks_use_study_defaults() {
        let mut machine = Machine::new();
        machine
            .add_drift("D", 1.0)
            .sample_all()
            .set_beam(Beam::default())
            .set_options(Options::default());
        let text = render(&machine);

        assert!(text.contains("sample, all;"));
        assert!(text.contains("beam, particle=\"e-\", energy=50, distrType=\"gausstwiss\""));
        assert!(text.contains("emitx=0.0000000005"));
        assert!(text.contains("option, physicsList=\"synch_rad em\""));
        assert!(text.contains("apertureType=\"elliptical\", aper1=0.5, aper2=0.3"));
        assert!(!text.contains("integratorSet"));
    }

    #[test]
    fn quads_ir_beam_and_options_differ_from_the_dipole_defaults() {
        let mut machine = Machine::new();
        machine
            .add_drift("D", 1.0)
            .set_beam(Beam::quads_ir())
            .set_options(Options::quads_ir());
        let text = render(&machine);

        assert!(text.contains("alfx=-0.035622, alfy=99.948526"));
        assert!(text.contains("betx=0.09051, bety=4881.193917"));
        // Dispersion and emittance match the dipole beam.
        assert!(text.contains("dispx=0.1337"));
        assert!(text.contains("emitx=0.0000000005"));
        assert!(text.contains("integratorSet=\"geant4\";"));
    }
}
