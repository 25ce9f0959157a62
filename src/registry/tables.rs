// Builtin mission tables — NAIF ids, aliases, and kernel source URLs.
//
// Candidate URL lists are ordered most-preferred first; the downloader
// walks them in order, so adding a mirror is a data edit here.

use super::{KernelFile, KernelSource, MissionDescriptor};

pub const NAIF_BASE: &str = "https://naif.jpl.nasa.gov/pub/naif";

/// Filename-prefix attribution rules for cache files not in the exact
/// name map (newer revisions of known kernel families, mostly).
pub const ATTRIBUTION_PREFIXES: &[(&str, &str)] = &[
    ("naif", "GENERIC"),
    ("pck", "GENERIC"),
    ("gm_de", "GENERIC"),
    ("de4", "GENERIC"),
    ("spp_", "PSP"),
    ("solo_", "SOLO"),
    ("juno_", "JUNO"),
    ("vgr1", "VOYAGER_1"),
    ("vgr2", "VOYAGER_2"),
    ("maven_", "MAVEN"),
    ("nh_", "NEW_HORIZONS"),
    ("msgr_", "MESSENGER"),
    ("gll_", "GALILEO"),
    ("ulysses_", "ULYSSES"),
    ("juice_", "JUICE"),
    ("bc_", "BEPICOLOMBO"),
    ("psyche_", "PSYCHE"),
    ("lcy_", "LUCY"),
    ("trj_", "EUROPA_CLIPPER"),
    ("mro_", "MRO"),
    ("m2020_", "MARS_2020"),
    ("lrorg_", "LRO"),
    ("lp_", "LUNAR_PROSPECTOR"),
    ("mgs_", "MGS"),
];

fn kernel(name: &str, urls: &[&str]) -> KernelFile {
    KernelFile {
        name: name.to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

/// Generic kernels every query needs, in load order: leapseconds first,
/// then planetary constants, then the planetary ephemeris.
pub fn generic_kernels() -> Vec<KernelFile> {
    vec![
        kernel(
            "naif0012.tls",
            &["https://naif.jpl.nasa.gov/pub/naif/generic_kernels/lsk/naif0012.tls"],
        ),
        kernel(
            "pck00011.tpc",
            &["https://naif.jpl.nasa.gov/pub/naif/generic_kernels/pck/pck00011.tpc"],
        ),
        kernel(
            "gm_de440.tpc",
            &["https://naif.jpl.nasa.gov/pub/naif/generic_kernels/pck/gm_de440.tpc"],
        ),
        kernel(
            "de440s.bsp",
            &["https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets/de440s.bsp"],
        ),
    ]
}

fn single(key: &str, naif_id: i32, aliases: &[&str], files: Vec<KernelFile>) -> MissionDescriptor {
    MissionDescriptor {
        key: key.to_string(),
        naif_id,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        kernels: KernelSource::SingleFile { files },
    }
}

fn segmented(key: &str, naif_id: i32, aliases: &[&str], manifest: &'static str) -> MissionDescriptor {
    MissionDescriptor {
        key: key.to_string(),
        naif_id,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        kernels: KernelSource::Segmented { manifest },
    }
}

fn body(key: &str, naif_id: i32, aliases: &[&str]) -> MissionDescriptor {
    MissionDescriptor {
        key: key.to_string(),
        naif_id,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        kernels: KernelSource::Generic,
    }
}

/// The full builtin mission set, in stable registration order:
/// heliophysics missions, planetary missions, then natural bodies and
/// barycenters.
pub fn builtin_missions() -> Vec<MissionDescriptor> {
    vec![
        // Heliophysics missions
        single(
            "PSP",
            -96,
            &["Parker", "Parker Solar Probe"],
            vec![kernel(
                "spp_nom_20180812_20300101_v043_PostV7.bsp",
                &["https://cdaweb.gsfc.nasa.gov/pub/data/psp/ephemeris/spice/ephemerides/spp_nom_20180812_20300101_v043_PostV7.bsp"],
            )],
        ),
        single(
            "SOLO",
            -144,
            &["Solar Orbiter", "SolOrb"],
            vec![kernel(
                "solo_ANC_soc-orbit-stp_20200210-20301120_399_V1_00513_V01.bsp",
                &["https://spiftp.esac.esa.int/data/SPICE/SOLAR-ORBITER/kernels/spk/solo_ANC_soc-orbit-stp_20200210-20301120_399_V1_00513_V01.bsp"],
            )],
        ),
        body("ACE", -92, &[]),
        body("WIND", -8, &[]),
        body("DSCOVR", -78, &[]),
        body("MMS1", -189, &["MMS"]),
        body("MMS2", -190, &[]),
        body("MMS3", -191, &[]),
        body("MMS4", -192, &[]),
        single(
            "STEREO_A",
            -234,
            &["StereoA", "STEREO Ahead"],
            vec![kernel(
                "STEREO-A_merged.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/STEREO/kernels/spk/STEREO-A_merged.bsp"],
            )],
        ),
        single(
            "STEREO_B",
            -235,
            &["StereoB", "STEREO Behind"],
            vec![kernel(
                "behind_2026_029_01.epm.bsp",
                &["https://sohoftp.nascom.nasa.gov/solarsoft/stereo/gen/data/spice/epm/behind/behind_2026_029_01.epm.bsp"],
            )],
        ),
        single(
            "HELIOS_1",
            -301,
            &["Helios1"],
            vec![
                kernel(
                    "100528R_helios1_74345_81272.bsp",
                    &["https://naif.jpl.nasa.gov/pub/naif/HELIOS/kernels/spk/100528R_helios1_74345_81272.bsp"],
                ),
                kernel(
                    "160707AP_helios1_81272_86074.bsp",
                    &["https://naif.jpl.nasa.gov/pub/naif/HELIOS/kernels/spk/160707AP_helios1_81272_86074.bsp"],
                ),
            ],
        ),
        single(
            "HELIOS_2",
            -302,
            &["Helios2"],
            vec![kernel(
                "100607R_helios2_76016_80068.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/HELIOS/kernels/spk/100607R_helios2_76016_80068.bsp"],
            )],
        ),
        single(
            "ULYSSES",
            -55,
            &[],
            vec![kernel(
                "ulysses_1990_2009_2050.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/ULYSSES/kernels/spk/ulysses_1990_2009_2050.bsp"],
            )],
        ),
        single(
            "THEMIS_A",
            -650,
            &["THEMIS"],
            vec![kernel(
                "THEMIS_A_definitive_trajectory.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/THEMIS/kernels/spk/THEMIS_A_definitive_trajectory.bsp"],
            )],
        ),
        single(
            "THEMIS_B",
            -651,
            &["ARTEMIS P1"],
            vec![kernel(
                "THEMIS_B_definitive_trajectory.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/THEMIS/kernels/spk/THEMIS_B_definitive_trajectory.bsp"],
            )],
        ),
        single(
            "THEMIS_C",
            -652,
            &["ARTEMIS P2"],
            vec![kernel(
                "THEMIS_C_definitive_trajectory.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/THEMIS/kernels/spk/THEMIS_C_definitive_trajectory.bsp"],
            )],
        ),
        single(
            "THEMIS_D",
            -653,
            &[],
            vec![kernel(
                "THEMIS_D_definitive_trajectory.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/THEMIS/kernels/spk/THEMIS_D_definitive_trajectory.bsp"],
            )],
        ),
        single(
            "THEMIS_E",
            -654,
            &[],
            vec![kernel(
                "THEMIS_E_definitive_trajectory.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/THEMIS/kernels/spk/THEMIS_E_definitive_trajectory.bsp"],
            )],
        ),
        // Planetary and deep-space missions
        segmented("CASSINI", -82, &[], "cassini"),
        single(
            "JUNO",
            -61,
            &[],
            vec![kernel(
                "juno_rec_orbit.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/JUNO/kernels/spk/juno_rec_orbit.bsp"],
            )],
        ),
        single(
            "VOYAGER_1",
            -31,
            &["Voyager1", "VGR1"],
            vec![kernel(
                "vgr1.x2100.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/VOYAGER/kernels/spk/vgr1.x2100.bsp"],
            )],
        ),
        single(
            "VOYAGER_2",
            -32,
            &["Voyager2", "VGR2"],
            vec![kernel(
                "vgr2.x2100.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/VOYAGER/kernels/spk/vgr2.x2100.bsp"],
            )],
        ),
        single(
            "MAVEN",
            -202,
            &[],
            vec![kernel(
                "maven_orb_rec.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/MAVEN/kernels/spk/maven_orb_rec.bsp"],
            )],
        ),
        single(
            "GALILEO",
            -77,
            &[],
            vec![kernel(
                "gll_951120_021126_raj2021.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/GLL/kernels/spk/gll_951120_021126_raj2021.bsp"],
            )],
        ),
        single(
            "PIONEER_10",
            -23,
            &["Pioneer10"],
            vec![kernel(
                "p10-a.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/PIONEER10/kernels/spk/p10-a.bsp"],
            )],
        ),
        single(
            "PIONEER_11",
            -24,
            &["Pioneer11"],
            vec![kernel(
                "p11-a.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/PIONEER11/kernels/spk/p11-a.bsp"],
            )],
        ),
        single(
            "MESSENGER",
            -236,
            &[],
            vec![kernel(
                "msgr_040803_150430_150430_od431sc_2.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/pds/data/mess-e_v_h-spice-6-v1.0/messsp_1000/data/spk/msgr_040803_150430_150430_od431sc_2.bsp"],
            )],
        ),
        single(
            "NEW_HORIZONS",
            -98,
            &["NewHorizons", "NH"],
            vec![kernel(
                "nh_pred_alleph_od161.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/pds/data/nh-j_p_ss-spice-6-v1.0/nhsp_1000/data/spk/nh_pred_alleph_od161.bsp"],
            )],
        ),
        single(
            "DAWN",
            -203,
            &[],
            vec![kernel(
                "dawn_ephem_2018.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/DAWN/kernels/spk/Dawn_ephem_2018.bsp"],
            )],
        ),
        single(
            "LUCY",
            -49,
            &[],
            vec![kernel(
                "lcy_250917_330402_250730_OD093-R-MEF2-P-TCM37a-P_v1.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/LUCY/kernels/spk/lcy_250917_330402_250730_OD093-R-MEF2-P-TCM37a-P_v1.bsp"],
            )],
        ),
        single(
            "EUROPA_CLIPPER",
            -159,
            &["EuropaClipper", "Clipper"],
            vec![kernel(
                "trj_251001-260516-dco2601141914-cruise013-predict-OD078-v1.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/EUROPACLIPPER/kernels/spk/trj_251001-260516-dco2601141914-cruise013-predict-OD078-v1.bsp"],
            )],
        ),
        single(
            "PSYCHE",
            -255,
            &[],
            vec![kernel(
                "psyche_sc-eph_250912-260601_260114_v1.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/PSYCHE/kernels/spk/psyche_sc-eph_250912-260601_260114_v1.bsp"],
            )],
        ),
        single(
            "JUICE",
            -28,
            &[],
            vec![kernel(
                "juice_crema_5_1_150lb_23_1_v01.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/JUICE/kernels/spk/juice_crema_5_1_150lb_23_1_v01.bsp"],
            )],
        ),
        single(
            "BEPICOLOMBO",
            -121,
            &["Bepi", "Bepi Colombo", "MPO"],
            vec![kernel(
                "bc_mtm_scp_cruise_20181016_20251205_v01.bsp",
                &["https://naif.jpl.nasa.gov/pub/naif/BEPICOLOMBO/kernels/spk/bc_mtm_scp_cruise_20181016_20251205_v01.bsp"],
            )],
        ),
        segmented("MARS_2020", -168, &["Mars2020", "Perseverance"], "mars2020"),
        segmented("MRO", -74, &[], "mro"),
        segmented("LRO", -85, &["Lunar Reconnaissance Orbiter"], "lro"),
        segmented("LUNAR_PROSPECTOR", -25, &["LP"], "lunar_prospector"),
        segmented("MGS", -94, &["Mars Global Surveyor"], "mgs"),
        // Natural bodies (observer/target)
        body("SUN", 10, &[]),
        body("EARTH", 399, &[]),
        body("MOON", 301, &[]),
        body("MERCURY", 199, &[]),
        body("VENUS", 299, &[]),
        // Outer planets resolve to barycenters: the body centers are not in
        // de440s.bsp.
        body("MARS", 4, &[]),
        body("JUPITER", 5, &[]),
        body("SATURN", 6, &[]),
        body("URANUS", 7, &[]),
        body("NEPTUNE", 8, &[]),
        body("PLUTO", 9, &[]),
        // Barycenters
        body("SSB", 0, &["Solar System Barycenter"]),
        body("EARTH_BARYCENTER", 3, &[]),
        body("MARS_BARYCENTER", 4, &[]),
        body("JUPITER_BARYCENTER", 5, &[]),
        body("SATURN_BARYCENTER", 6, &[]),
    ]
}
