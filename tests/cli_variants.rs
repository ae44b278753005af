use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn command_variants() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("phylodist");
    cmd.arg("variants").arg("Homo sapiens");
    cmd.assert().success().stdout(
        "Homo sapiens\tHomo sapiens\n\
         Homo sapiens\thomo sapiens\n\
         Homo sapiens\thomo_sapiens\n\
         Homo sapiens\tHomo_sapiens\n",
    );

    Ok(())
}

#[test]
fn command_variants_multiple() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("phylodist");
    cmd.arg("variants")
        .arg("Panthera_leo_ott563151")
        .arg("   ")
        .arg("Felidae");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Panthera_leo_ott563151\tpanthera leo\n"))
        .stdout(predicate::str::contains("Felidae\tfelidae\n"))
        .stdout(predicate::str::contains("   \t").not());

    Ok(())
}

#[test]
fn command_variants_canonical() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("phylodist");
    cmd.arg("variants")
        .arg("Homo_sapiens_ott770315")
        .arg("'Felis catus'")
        .arg("--canonical");
    cmd.assert().success().stdout(
        "Homo_sapiens_ott770315\tHomo_sapiens\n\
         'Felis catus'\tFelis_catus\n",
    );

    Ok(())
}
