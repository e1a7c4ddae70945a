//! ffmpeg text encoding of a merge graph.
//!
//! This is the only place that knows ffmpeg's filtergraph syntax.

use crate::conversation::graph::{MergeGraph, MergeStep};
use crate::defaults;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Audio encoder options for the stereo artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub codec: String,
    pub quality: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            codec: defaults::CODEC.to_string(),
            quality: defaults::QUALITY,
        }
    }
}

/// Render one merge step as an ffmpeg filter chain.
pub fn encode_step(step: &MergeStep) -> String {
    match step {
        MergeStep::Normalize {
            clip,
            sample_rate,
            sample_format,
            output,
        } => format!(
            "[{}:a]aresample={},aformat=sample_fmts={}:channel_layouts=mono{}",
            clip.0, sample_rate, sample_format, output
        ),
        MergeStep::ResetTimestamps { input, output } => {
            format!("{}asetpts=N/SR{}", input, output)
        }
        MergeStep::Silence {
            sample_rate,
            duration,
            output,
        } => format!(
            "anullsrc=r={}:cl=mono:d={:.prec$}{}",
            sample_rate,
            duration,
            output,
            prec = defaults::SILENCE_DURATION_DECIMALS
        ),
        MergeStep::Concat { inputs, output } => {
            let labels: String = inputs.iter().map(|l| l.to_string()).collect();
            format!("{}concat=n={}:v=0:a=1{}", labels, inputs.len(), output)
        }
        MergeStep::StereoCombine {
            left,
            right,
            output,
        } => format!(
            "{}{}amerge=inputs=2,pan=stereo|c0=c0|c1=c1{}",
            left, right, output
        ),
    }
}

/// Render the whole graph in ffmpeg's filtergraph syntax.
///
/// The text grows with every turn, so it is handed to ffmpeg as a script file
/// rather than a single command-line argument.
pub fn encode_filter_complex(graph: &MergeGraph) -> String {
    graph
        .steps
        .iter()
        .map(encode_step)
        .collect::<Vec<_>>()
        .join(";")
}

/// Build the full ffmpeg argument list for one conversation.
///
/// `script` holds `encode_filter_complex(graph)`. `inputs[i]` must be the clip
/// referenced by `ClipId(i)` in the graph.
pub fn ffmpeg_args(
    graph: &MergeGraph,
    script: &Path,
    inputs: &[PathBuf],
    output: &Path,
    encoder: &EncoderSettings,
) -> Vec<OsString> {
    let mut args = vec![OsString::from("-y")];
    for input in inputs {
        args.push("-i".into());
        args.push(input.as_os_str().to_owned());
    }

    args.push("-filter_complex_script".into());
    args.push(script.as_os_str().to_owned());
    args.extend(
        [
            "-map".to_string(),
            graph.output.to_string(),
            "-c:a".to_string(),
            encoder.codec.clone(),
            "-q:a".to_string(),
            encoder.quality.to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::graph::{Label, compile};
    use crate::conversation::timeline::{ClipId, Timelines};
    use crate::conversation::turn::{Role, Turn};

    fn three_turn_graph() -> MergeGraph {
        let turns = [
            (Role::Agent, 2.0),
            (Role::Customer, 1.5),
            (Role::Agent, 3.0),
        ]
        .iter()
        .enumerate()
        .map(|(i, (role, duration))| Turn {
            sort_key: i.to_string(),
            role: *role,
            path: PathBuf::from(format!("{}_{}.mp3", i, role)),
            duration: *duration,
        })
        .collect::<Vec<_>>();
        compile(&Timelines::build(&turns).unwrap(), 48000).unwrap()
    }

    #[test]
    fn test_encode_normalize() {
        let step = MergeStep::Normalize {
            clip: ClipId(4),
            sample_rate: 48000,
            sample_format: "s16",
            output: Label::new("in4"),
        };
        assert_eq!(
            encode_step(&step),
            "[4:a]aresample=48000,aformat=sample_fmts=s16:channel_layouts=mono[in4]"
        );
    }

    #[test]
    fn test_encode_silence_uses_microsecond_precision() {
        let step = MergeStep::Silence {
            sample_rate: 48000,
            duration: 1.2345678,
            output: Label::new("c0"),
        };
        assert_eq!(
            encode_step(&step),
            "anullsrc=r=48000:cl=mono:d=1.234568[c0]"
        );
    }

    #[test]
    fn test_encode_full_filter_complex() {
        let text = encode_filter_complex(&three_turn_graph());
        let chains: Vec<&str> = text.split(';').collect();

        assert_eq!(
            chains,
            vec![
                "[0:a]aresample=48000,aformat=sample_fmts=s16:channel_layouts=mono[in0]",
                "[in0]asetpts=N/SR[a0]",
                "anullsrc=r=48000:cl=mono:d=1.500000[a1]",
                "[2:a]aresample=48000,aformat=sample_fmts=s16:channel_layouts=mono[in2]",
                "[in2]asetpts=N/SR[a2]",
                "anullsrc=r=48000:cl=mono:d=2.000000[c0]",
                "[1:a]aresample=48000,aformat=sample_fmts=s16:channel_layouts=mono[in1]",
                "[in1]asetpts=N/SR[c1]",
                "anullsrc=r=48000:cl=mono:d=3.000000[c2]",
                "[a0][a1][a2]concat=n=3:v=0:a=1[agent]",
                "[c0][c1][c2]concat=n=3:v=0:a=1[customer]",
                "[agent][customer]amerge=inputs=2,pan=stereo|c0=c0|c1=c1[st]",
            ]
        );
    }

    fn lossy(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_ffmpeg_args_layout() {
        let graph = three_turn_graph();
        let inputs = vec![
            PathBuf::from("/in/c1/0_agent.mp3"),
            PathBuf::from("/in/c1/1_customer.mp3"),
            PathBuf::from("/in/c1/2_agent.mp3"),
        ];
        let args = lossy(&ffmpeg_args(
            &graph,
            Path::new("/tmp/c1.filtergraph"),
            &inputs,
            Path::new("/out/20250101T000000_c1_stereo.mp3"),
            &EncoderSettings::default(),
        ));

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/in/c1/0_agent.mp3",
                "-i",
                "/in/c1/1_customer.mp3",
                "-i",
                "/in/c1/2_agent.mp3",
                "-filter_complex_script",
                "/tmp/c1.filtergraph",
                "-map",
                "[st]",
                "-c:a",
                "libmp3lame",
                "-q:a",
                "2",
                "/out/20250101T000000_c1_stereo.mp3",
            ]
        );
    }

    #[test]
    fn test_encoder_settings_are_passed_through() {
        let graph = three_turn_graph();
        let encoder = EncoderSettings {
            codec: "pcm_s16le".to_string(),
            quality: 0,
        };
        let args = lossy(&ffmpeg_args(
            &graph,
            Path::new("g.txt"),
            &[],
            Path::new("out.wav"),
            &encoder,
        ));
        let codec_pos = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(args[codec_pos + 1], "pcm_s16le");
        assert_eq!(args[codec_pos + 3], "0");
    }

    #[test]
    fn test_long_conversation_keeps_arguments_short() {
        let turns: Vec<Turn> = (0..1000)
            .map(|i| Turn {
                sort_key: format!("{:04}", i),
                role: if i % 2 == 0 { Role::Agent } else { Role::Customer },
                path: PathBuf::from(format!("/in/long/{:04}.mp3", i)),
                duration: 1.25,
            })
            .collect();
        let graph = compile(&Timelines::build(&turns).unwrap(), 48000).unwrap();
        let inputs: Vec<PathBuf> = turns.into_iter().map(|t| t.path).collect();

        // Linux rejects any single argument over 128 KiB.
        assert!(encode_filter_complex(&graph).len() > 128 * 1024);
        let args = ffmpeg_args(
            &graph,
            Path::new("/tmp/long.filtergraph"),
            &inputs,
            Path::new("out.mp3"),
            &EncoderSettings::default(),
        );
        assert!(args.iter().all(|a| a.len() < 256));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_are_not_mangled() {
        use std::os::unix::ffi::OsStrExt;

        let clip = PathBuf::from(std::ffi::OsStr::from_bytes(b"/in/caf\xe9/0_agent.mp3"));
        let args = ffmpeg_args(
            &three_turn_graph(),
            Path::new("g.txt"),
            std::slice::from_ref(&clip),
            Path::new("out.mp3"),
            &EncoderSettings::default(),
        );
        assert_eq!(args[2].as_os_str(), clip.as_os_str());
    }
}
